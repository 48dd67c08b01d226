//! Error types for kite-bundler operations.

use std::fmt;
use std::path::PathBuf;

use kite_config::ConfigError;

/// Error types for kite-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A module request could not be resolved.
    #[error("Cannot resolve '{request}' from {}", .importer.display())]
    Resolution { request: String, importer: PathBuf },

    /// A module has a recognized extension but no rule claims it.
    #[error("No loader rule matches {}", .path.display())]
    NoMatchingRule { path: PathBuf },

    /// A transform rejected its input.
    #[error("Transform '{transform}' failed on {}: {diagnostic}", .path.display())]
    Transform {
        path: PathBuf,
        transform: String,
        diagnostic: String,
    },

    /// A rule references a transform nobody registered.
    #[error("Unknown transform '{name}' in rule #{rule}")]
    UnknownTransform { name: String, rule: usize },

    /// Copy task failure (enumeration, read or write).
    #[error("Copy failed for {}: {message}", .path.display())]
    Copy { path: PathBuf, message: String },

    /// Invalid configuration detected before any file was processed.
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// Invalid configuration that the config crate cannot see (compiled
    /// patterns, alias manifests, duplicate destinations).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A plugin hook failed.
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error with the path it concerns.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for kite-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn plugin(plugin: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::Plugin {
            plugin: plugin.into(),
            message: message.to_string(),
        }
    }

    /// Coarse category used in summaries and exit codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Resolution { .. } | Error::NoMatchingRule { .. } => ErrorKind::Resolution,
            Error::Transform { .. } => ErrorKind::Transform,
            Error::Copy { .. } => ErrorKind::Copy,
            Error::Configuration(_) | Error::InvalidConfig(_) | Error::UnknownTransform { .. } => {
                ErrorKind::Configuration
            }
            Error::Plugin { .. } => ErrorKind::Plugin,
            Error::InvalidOutputPath(_) | Error::WriteFailure(_) | Error::Io { .. } => {
                ErrorKind::Io
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    Transform,
    Copy,
    Configuration,
    Plugin,
    Io,
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Resolution { .. } => "RESOLUTION_ERROR",
            Error::NoMatchingRule { .. } => "NO_MATCHING_RULE",
            Error::Transform { .. } => "TRANSFORM_ERROR",
            Error::UnknownTransform { .. } => "UNKNOWN_TRANSFORM",
            Error::Copy { .. } => "COPY_ERROR",
            Error::Configuration(_) | Error::InvalidConfig(_) => "CONFIGURATION_ERROR",
            Error::Plugin { .. } => "PLUGIN_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Io { .. } => "IO_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        match self {
            Error::Resolution { request, .. } => Some(Box::new(format!(
                "Check the spelling of '{}', the path aliases in your tsconfig, and that the package is installed.",
                request
            ))),
            Error::NoMatchingRule { path } => Some(Box::new(format!(
                "Add a [[rules]] entry whose 'test' matches '{}', or a generic rule with an empty 'use' list.",
                path.display()
            ))),
            Error::UnknownTransform { name, .. } => Some(Box::new(format!(
                "Built-in transforms are script, css, postcss, extract-css, json and template. '{}' must be registered before building.",
                name
            ))),
            Error::Configuration(e) => e.hint().map(|h| Box::new(h) as Box<dyn fmt::Display>),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays inside the output directory.",
                path
            ))),
            Error::WriteFailure(msg) | Error::Copy { message: msg, .. } => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}

/// Build pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    Resolve,
    Parse,
    Transform,
    Split,
    Emit,
    Finalize,
    Write,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Configuration => "configuration",
            Stage::Resolve => "resolve",
            Stage::Parse => "parse",
            Stage::Transform => "transform",
            Stage::Split => "split",
            Stage::Emit => "emit",
            Stage::Finalize => "finalize",
            Stage::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first unrecovered error of a build, annotated with its stage.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {error}")]
pub struct BuildError {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl BuildError {
    pub fn new(stage: Stage, error: impl Into<Error>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

impl miette::Diagnostic for BuildError {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        self.error.code()
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        self.error.help()
    }
}

/// Attach a stage to a fallible step.
pub(crate) trait StageExt<T> {
    fn stage(self, stage: Stage) -> std::result::Result<T, BuildError>;
}

impl<T, E: Into<Error>> StageExt<T> for std::result::Result<T, E> {
    fn stage(self, stage: Stage) -> std::result::Result<T, BuildError> {
        self.map_err(|e| BuildError::new(stage, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn build_error_names_the_stage() {
        let err = BuildError::new(
            Stage::Transform,
            Error::Transform {
                path: PathBuf::from("client/js/app.ts"),
                transform: "script".into(),
                diagnostic: "Unexpected token".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "transform stage failed: Transform 'script' failed on client/js/app.ts: Unexpected token"
        );
        assert_eq!(err.code().unwrap().to_string(), "TRANSFORM_ERROR");
    }

    #[test]
    fn kinds_group_variants() {
        let err = Error::NoMatchingRule {
            path: PathBuf::from("a.png"),
        };
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(
            Error::from(ConfigError::NoEntries).kind(),
            ErrorKind::Configuration
        );
    }
}
