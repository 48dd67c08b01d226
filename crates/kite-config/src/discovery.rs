//! File-based config discovery.
//!
//! Finds the kite configuration file for a project directory. Loading and
//! layering live in the `loading` module.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::defaults::DEFAULT_CONFIG_FILE;
use crate::error::{ConfigError, Result};

/// Where a configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A `kite.toml` (or any other TOML file passed explicitly).
    Toml(PathBuf),
    /// The `kite` field of a `package.json`.
    PackageJson(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Toml(path) | ConfigSource::PackageJson(path) => path,
        }
    }

    /// Classifies an explicit `--config` path by file name and extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return Ok(ConfigSource::PackageJson(path.to_path_buf()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(ConfigSource::Toml(path.to_path_buf())),
            Some(other) => Err(ConfigError::UnsupportedFormat(other.to_string())),
            None => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Searches a project directory for configuration in conventional locations.
///
/// # Example
///
/// ```no_run
/// use kite_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// if let Some(source) = discovery.find() {
///     println!("using {}", source.path().display());
/// }
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. kite.toml
    /// 2. package.json (kite field)
    pub fn find(&self) -> Option<ConfigSource> {
        let toml_path = self.root.join(DEFAULT_CONFIG_FILE);
        if toml_path.is_file() {
            return Some(ConfigSource::Toml(toml_path));
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.is_file() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("kite").is_some_and(|v| !v.is_null()) {
                        return Some(ConfigSource::PackageJson(pkg_path));
                    }
                }
            }
        }

        None
    }

    /// Like [`find`](Self::find) but fails with `ConfigError::NotFound`.
    pub fn require(&self) -> Result<ConfigSource> {
        self.find().ok_or(ConfigError::NotFound)
    }
}

/// Reads the `kite` field of a `package.json`.
pub(crate) fn read_package_json_section(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;

    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {}", e)),
    })?;

    match parsed.get("kite") {
        Some(Value::Null) => Err(ConfigError::InvalidValue {
            field: "kite".to_string(),
            hint: Some("The 'kite' field cannot be null".to_string()),
        }),
        Some(value) => Ok(value.clone()),
        None => Err(ConfigError::InvalidValue {
            field: "kite".to_string(),
            hint: Some("Add a 'kite' field to your package.json".to_string()),
        }),
    }
}
