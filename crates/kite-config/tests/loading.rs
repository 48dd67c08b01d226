//! Tests for layered loading from files.

use std::fs;
use std::path::PathBuf;

use kite_config::{ConfigError, ConfigLoader, CopyTransformConfig};
use tempfile::TempDir;

#[test]
fn toml_file_replaces_rule_list() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("kite.toml"),
        r#"
output_dir = "dist"

[[rules]]
test = '\.ts$'
use = ["script"]

[[copy]]
from = "static/sw.js"
to = "[name][ext]"
transform = { kind = "replace-placeholder", token = "__VERSION__" }
"#,
    )
    .unwrap();

    let cfg = ConfigLoader::new(dir.path()).without_env().load().unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("dist"));
    assert_eq!(cfg.rules.len(), 1);
    assert_eq!(cfg.rules[0].uses[0].transform, "script");
    assert_eq!(cfg.copy.len(), 1);
    assert_eq!(
        cfg.copy[0].transform,
        Some(CopyTransformConfig::ReplacePlaceholder {
            token: "__VERSION__".into()
        })
    );
    // untouched sections keep their defaults
    assert_eq!(cfg.styles.filename, "css/style.css");
}

#[test]
fn package_json_kite_field_is_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "app", "version": "1.0.0", "kite": { "manifest": true } }"#,
    )
    .unwrap();

    let cfg = ConfigLoader::new(dir.path()).without_env().load().unwrap();
    assert!(cfg.manifest);
    assert_eq!(cfg.root, dir.path());
}

#[test]
fn root_is_anchored_at_config_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("config");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("build.toml"), "root = \"..\"\n").unwrap();

    let cfg = ConfigLoader::new(dir.path())
        .file("config/build.toml")
        .without_env()
        .load()
        .unwrap();
    assert_eq!(cfg.root, dir.path());
}

#[test]
fn invalid_toml_types_are_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("kite.toml"), "clean = \"sometimes\"\n").unwrap();
    let err = ConfigLoader::new(dir.path()).without_env().load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
