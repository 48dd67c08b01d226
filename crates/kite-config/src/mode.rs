//! Build mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marker substituted for cache-bust placeholders outside production builds.
pub const DEV_MARKER: &str = "dev";

/// Production or development.
///
/// Resolved once when a build starts and passed explicitly to every stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Production,
    #[default]
    Development,
}

impl BuildMode {
    /// `NODE_ENV=production` selects production; any other value (or none) is development.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => BuildMode::Production,
            _ => BuildMode::Development,
        }
    }

    /// Reads `NODE_ENV` from the process environment.
    pub fn from_env() -> Self {
        Self::from_node_env(std::env::var("NODE_ENV").ok().as_deref())
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    /// Whether scripts and styles are minified.
    pub fn minify(self) -> bool {
        self.is_production()
    }

    /// Whether chunk source maps are written when the config does not say.
    pub fn default_source_maps(self) -> bool {
        !self.is_production()
    }

    /// Value a cache-bust placeholder is replaced with.
    pub fn cache_bust_value(self, version: &str) -> &str {
        match self {
            BuildMode::Production => version,
            BuildMode::Development => DEV_MARKER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Production => "production",
            BuildMode::Development => "development",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(BuildMode::Production),
            "development" | "dev" => Ok(BuildMode::Development),
            other => Err(format!("Invalid build mode: {other}")),
        }
    }
}
