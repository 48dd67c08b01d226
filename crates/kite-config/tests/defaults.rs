//! Tests for the default configuration.

use std::path::PathBuf;

use kite_config::{CopyTransformConfig, KiteConfig, validate_schema};
use regex::Regex;

#[test]
fn default_layout_matches_reference_project() {
    let cfg = KiteConfig::default();
    assert_eq!(cfg.output_dir, PathBuf::from("public"));
    assert_eq!(cfg.entry.name, "js/bundle.js");
    assert_eq!(cfg.entry.sources, vec![PathBuf::from("client/js/vue.ts")]);
    assert_eq!(cfg.split.vendor_chunk, "js/bundle.vendor.js");
    assert_eq!(cfg.styles.filename, "css/style.css");
    assert_eq!(cfg.resolve.extensions, [".js", ".vue", ".json", ".ts"]);
    assert_eq!(cfg.externals.get("json3").map(String::as_str), Some("JSON"));
}

#[test]
fn script_rule_matches_js_and_ts_only() {
    let cfg = KiteConfig::default();
    let re = Regex::new(&cfg.rules[0].test).unwrap();
    assert!(re.is_match("client/js/app.ts"));
    assert!(re.is_match("client/js/app.js"));
    assert!(!re.is_match("client/js/app.{js,ts}"));
    assert!(!re.is_match("client/css/app.css"));
}

#[test]
fn css_chain_ends_with_extraction() {
    let cfg = KiteConfig::default();
    let css = cfg.rules.iter().find(|r| r.test == r"\.css$").unwrap();
    let names: Vec<_> = css.uses.iter().map(|u| u.transform.as_str()).collect();
    assert_eq!(names, ["extract-css", "css", "postcss"]);
}

#[test]
fn service_worker_task_replaces_placeholder() {
    let cfg = KiteConfig::default();
    let sw = cfg
        .copy
        .iter()
        .find(|t| t.from == "client/service-worker.js")
        .unwrap();
    assert_eq!(
        sw.transform,
        Some(CopyTransformConfig::ReplacePlaceholder {
            token: "__HASH__".into()
        })
    );

    let top_level = cfg.copy.iter().find(|t| t.from == "client/*").unwrap();
    assert!(top_level.ignore.contains(&"**/service-worker.js".to_string()));
    assert!(top_level.ignore.contains(&"**/index.html.tpl".to_string()));
}

#[test]
fn debug_is_substituted_with_noop() {
    let cfg = KiteConfig::default();
    assert_eq!(cfg.substitutions.len(), 1);
    assert_eq!(cfg.substitutions[0].pattern, "debug");
    assert_eq!(cfg.substitutions[0].replacement, PathBuf::from("scripts/noop.js"));
}

#[test]
fn defaults_are_schema_valid() {
    validate_schema(&KiteConfig::default()).unwrap();
}
