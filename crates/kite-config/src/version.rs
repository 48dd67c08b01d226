//! Version cache-bust token.

use std::fs;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::KiteConfig;
use crate::error::{ConfigError, Result};

/// Number of hex characters kept from the version digest.
const CACHE_BUST_LEN: usize = 10;

/// Short, URL-safe token derived from a release version string.
pub fn version_cache_bust(version: &str) -> String {
    let mut hex = format!("{:x}", Sha256::digest(version.as_bytes()));
    hex.truncate(CACHE_BUST_LEN);
    hex
}

/// The build's version identifier.
///
/// An explicit `version` is used verbatim. Otherwise the `version` field of
/// `<root>/package.json` is hashed with [`version_cache_bust`]. Returns
/// `None` when neither is available.
pub fn resolve_version(config: &KiteConfig) -> Result<Option<String>> {
    if let Some(version) = &config.version {
        return Ok(Some(version.clone()));
    }
    package_version(&config.root).map(|v| v.map(|v| version_cache_bust(&v)))
}

fn package_version(root: &Path) -> Result<Option<String>> {
    let pkg_path = root.join("package.json");
    if !pkg_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&pkg_path)?;
    let parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
        field: "package.json".to_string(),
        hint: Some(format!("Invalid JSON: {e}")),
    })?;
    Ok(parsed
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string))
}
