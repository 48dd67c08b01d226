//! Layered configuration loading.
//!
//! Priority: overrides > environment (`KITE_*`) > config file > defaults.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::config::KiteConfig;
use crate::discovery::{ConfigDiscovery, ConfigSource, read_package_json_section};
use crate::error::{ConfigError, Result};

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `KITE_STYLES__FILENAME`.
pub const ENV_PREFIX: &str = "KITE_";

/// Values that take precedence over every other source (typically CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_maps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
}

/// Builder for a layered [`KiteConfig`].
///
/// # Example
///
/// ```no_run
/// use kite_config::{ConfigLoader, ConfigOverrides};
///
/// let config = ConfigLoader::new(".")
///     .overrides(ConfigOverrides { clean: Some(true), ..Default::default() })
///     .load()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    project_dir: PathBuf,
    explicit: Option<PathBuf>,
    overrides: ConfigOverrides,
    use_env: bool,
}

impl ConfigLoader {
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            explicit: None,
            overrides: ConfigOverrides::default(),
            use_env: true,
        }
    }

    /// Use this file instead of discovering one.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Skip the `KITE_*` environment layer.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// The config file that will be read, if any.
    pub fn source(&self) -> Result<Option<ConfigSource>> {
        match &self.explicit {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    self.project_dir.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::InvalidValue {
                        field: "config".to_string(),
                        hint: Some(format!("Config file not found: {}", path.display())),
                    });
                }
                ConfigSource::from_path(&path).map(Some)
            }
            None => Ok(ConfigDiscovery::new(&self.project_dir).find()),
        }
    }

    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(KiteConfig::default()));

        match self.source()? {
            Some(ConfigSource::Toml(path)) => {
                tracing::debug!(path = %path.display(), "loading TOML config");
                figment = figment.merge(Toml::file(path));
            }
            Some(ConfigSource::PackageJson(path)) => {
                tracing::debug!(path = %path.display(), "loading package.json config");
                figment = figment.merge(Serialized::defaults(read_package_json_section(&path)?));
            }
            None => tracing::debug!("no config file found, using defaults"),
        }

        if self.use_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(Serialized::defaults(&self.overrides)))
    }

    /// Extract the merged configuration and anchor its root.
    pub fn load(&self) -> Result<KiteConfig> {
        let base = match self.source()? {
            Some(source) => source
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.project_dir.clone()),
            None => self.project_dir.clone(),
        };

        let mut config: KiteConfig =
            self.figment()?
                .extract()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "configuration".to_string(),
                    hint: Some(format!("Check kite.toml syntax and field types: {e}")),
                })?;

        config.anchor_root(&base);
        Ok(config)
    }
}
