//! Pluggable config validation strategies
//!
//! Schema validation checks the configuration on its own. Filesystem
//! validation additionally checks that every referenced source exists.
//! Both run before any file is processed.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::KiteConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &KiteConfig) -> Result<()>;
}

/// Characters that make a copy source a glob rather than a literal path.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Whether a copy source contains glob syntax.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Schema-only validation (no filesystem checks)
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &KiteConfig) -> Result<()> {
        if config.entry.sources.is_empty() {
            return Err(ConfigError::NoEntries);
        }

        if config.entry.name.trim().is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "entry name cannot be empty".to_string(),
                hint: Some("Set [entry] name, e.g. \"js/bundle.js\"".to_string()),
            });
        }

        for (index, rule) in config.rules.iter().enumerate() {
            compile(&format!("rules[{index}].test"), &rule.test)?;
            if rule.uses.iter().any(|u| u.transform.trim().is_empty()) {
                return Err(ConfigError::SchemaValidation {
                    message: format!("rules[{index}] has a transform with an empty name"),
                    hint: None,
                });
            }
        }

        for (index, sub) in config.substitutions.iter().enumerate() {
            compile(&format!("substitutions[{index}].pattern"), &sub.pattern)?;
            if let Some(issuer) = &sub.issuer {
                compile(&format!("substitutions[{index}].issuer"), issuer)?;
            }
        }

        for (index, task) in config.copy.iter().enumerate() {
            if task.from.trim().is_empty() || task.to.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: format!("copy[{index}] needs both 'from' and 'to'"),
                    hint: Some("Use 'to = \"[name][ext]\"' to copy into the output root".into()),
                });
            }
        }

        for specifier in config.externals.keys() {
            if specifier.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "external specifiers cannot be empty".to_string(),
                    hint: Some("Remove empty keys from [externals]".to_string()),
                });
            }
        }

        let split = &config.split;
        if split.vendor_chunk.trim().is_empty() || config.styles.filename.trim().is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "output names cannot be empty".to_string(),
                hint: None,
            });
        }
        if split.vendor_chunk == split.entry_chunk.replace("[name]", &config.entry.name) {
            return Err(ConfigError::SchemaValidation {
                message: format!(
                    "vendor chunk '{}' collides with the entry chunk",
                    split.vendor_chunk
                ),
                hint: Some("Give [split] vendor_chunk a distinct name".to_string()),
            });
        }

        Ok(())
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Filesystem validator
///
/// Checks the project root, entry sources, rule include directories,
/// substitution stand-ins, the alias manifest and literal copy sources.
/// Glob copy sources may legitimately match nothing and are not checked.
pub struct FsValidator;

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &KiteConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        if !config.root.is_dir() {
            return Err(ConfigError::RootNotFound(config.root.clone()));
        }

        for source in &config.entry.sources {
            let path = config.root_path(source);
            if !path.is_file() {
                return Err(ConfigError::EntryNotFound { path });
            }
        }

        for (index, rule) in config.rules.iter().enumerate() {
            for include in &rule.include {
                let path = config.root_path(include);
                if !path.is_dir() {
                    return Err(ConfigError::IncludeNotFound { index, path });
                }
            }
        }

        for sub in &config.substitutions {
            let path = config.root_path(&sub.replacement);
            if !path.is_file() {
                return Err(ConfigError::ReplacementNotFound { path });
            }
        }

        if let Some(manifest) = &config.resolve.alias_manifest {
            let path = config.root_path(manifest);
            if !path.is_file() {
                return Err(ConfigError::AliasManifestNotFound { path });
            }
        }

        for task in &config.copy {
            if is_glob(&task.from) {
                continue;
            }
            let path = config.root_path(task.from.trim_start_matches("./"));
            if !exists(&path) {
                return Err(ConfigError::CopySourceNotFound {
                    from: task.from.clone(),
                    path,
                });
            }
        }

        Ok(())
    }
}

fn exists(path: &Path) -> bool {
    path.is_file() || path.is_dir()
}

/// Validate with filesystem checks.
pub fn validate_fs(config: &KiteConfig) -> Result<()> {
    FsValidator.validate(config)
}

/// Validate without touching the filesystem.
pub fn validate_schema(config: &KiteConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Root-relative path of every literal copy source (used by `kite check`).
pub fn literal_copy_sources(config: &KiteConfig) -> Vec<PathBuf> {
    config
        .copy
        .iter()
        .filter(|task| !is_glob(&task.from))
        .map(|task| config.root_path(task.from.trim_start_matches("./")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_detection() {
        assert!(is_glob("client/*"));
        assert!(is_glob("webfonts/fa-solid-900.woff*"));
        assert!(is_glob("img/{a,b}.png"));
        assert!(!is_glob("client/service-worker.js"));
    }

    #[test]
    fn schema_rejects_bad_rule_regex() {
        let mut config = KiteConfig::default();
        config.rules[0].test = "\\.(js|ts$".to_string();
        let err = validate_schema(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { field, .. } if field == "rules[0].test"));
    }

    #[test]
    fn schema_rejects_colliding_chunk_names() {
        let mut config = KiteConfig::default();
        config.split.vendor_chunk = "js/bundle.js".to_string();
        assert!(matches!(
            validate_schema(&config),
            Err(ConfigError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn defaults_pass_schema_validation() {
        validate_schema(&KiteConfig::default()).unwrap();
    }
}
