//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Filesystem validation errors
    #[error("project root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("entry source not found: {path}")]
    EntryNotFound { path: PathBuf },

    #[error("rule #{index} includes a directory that does not exist: {path}")]
    IncludeNotFound { index: usize, path: PathBuf },

    #[error("copy task '{from}' references a source that does not exist: {path}")]
    CopySourceNotFound { from: String, path: PathBuf },

    #[error("substitution replacement not found: {path}")]
    ReplacementNotFound { path: PathBuf },

    #[error("path alias manifest not found: {path}")]
    AliasManifestNotFound { path: PathBuf },

    // Config parsing/loading errors
    #[error("config not found")]
    NotFound,

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid config value for '{field}'{}", hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid pattern '{pattern}' in {field}: {message}")]
    InvalidPattern {
        field: String,
        pattern: String,
        message: String,
    },

    // Schema validation errors (no filesystem checks)
    #[error("no entry sources specified")]
    NoEntries,

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Short remediation hint, if the variant carries or implies one.
    pub fn hint(&self) -> Option<String> {
        match self {
            ConfigError::NotFound => {
                Some("Create a kite.toml or add a \"kite\" field to package.json".to_string())
            }
            ConfigError::EntryNotFound { .. } => {
                Some("Check the [entry] sources in your config".to_string())
            }
            ConfigError::InvalidValue { hint, .. } => hint.clone(),
            ConfigError::SchemaValidation { hint, .. } => hint.clone(),
            ConfigError::InvalidPattern { .. } => {
                Some("Patterns use Rust regex syntax (e.g. '\\.(js|ts)$')".to_string())
            }
            _ => None,
        }
    }
}
