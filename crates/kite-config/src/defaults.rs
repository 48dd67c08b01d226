//! Default values.
//!
//! The defaults describe the reference client project: sources under
//! `client/`, third-party code under `node_modules/`, output in `public/`.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::json;

use crate::config::{
    CopyConfig, CopyTransformConfig, EntryConfig, KiteConfig, ResolveConfig, RuleConfig,
    SplitConfig, StylesConfig, SubstitutionConfig, UseConfig,
};

pub const DEFAULT_CONFIG_FILE: &str = "kite.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "public";
pub const DEFAULT_ENTRY_NAME: &str = "js/bundle.js";
pub const DEFAULT_VENDOR_DIR: &str = "node_modules";
pub const DEFAULT_VENDOR_CHUNK: &str = "js/bundle.vendor.js";
pub const DEFAULT_STYLESHEET: &str = "css/style.css";
pub const CACHE_BUST_PLACEHOLDER: &str = "__HASH__";

/// Extensions tried by the resolver, in order.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".vue", ".json", ".ts"];

impl Default for KiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            entry: EntryConfig::default(),
            resolve: ResolveConfig::default(),
            rules: default_rules(),
            split: SplitConfig::default(),
            styles: StylesConfig::default(),
            copy: default_copy_tasks(),
            substitutions: vec![SubstitutionConfig {
                pattern: "debug".to_string(),
                replacement: PathBuf::from("scripts/noop.js"),
                issuer: None,
            }],
            externals: IndexMap::from([("json3".to_string(), "JSON".to_string())]),
            version: None,
            source_maps: None,
            manifest: false,
            clean: false,
        }
    }
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ENTRY_NAME.to_string(),
            sources: vec![PathBuf::from("client/js/vue.ts")],
        }
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            alias_manifest: Some(PathBuf::from("client/tsconfig.json")),
            base_url: Some(PathBuf::from("client")),
            modules: vec![PathBuf::from(DEFAULT_VENDOR_DIR)],
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            vendor_dir: DEFAULT_VENDOR_DIR.to_string(),
            vendor_chunk: DEFAULT_VENDOR_CHUNK.to_string(),
            entry_chunk: "[name]".to_string(),
        }
    }
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

/// Loader rules of the reference project, followed by the generic rules
/// that let markup parts, JSON and third-party scripts through.
pub fn default_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig {
            test: r"\.(js|ts)$".to_string(),
            include: vec![PathBuf::from("client")],
            exclude: vec![PathBuf::from(DEFAULT_VENDOR_DIR)],
            uses: vec![UseConfig::new("script")],
        },
        RuleConfig {
            test: r"\.css$".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: vec![
                UseConfig::with_options("extract-css", json!({ "esModule": false })),
                UseConfig::with_options(
                    "css",
                    json!({ "url": false, "importLoaders": 1, "sourceMap": true }),
                ),
                UseConfig::with_options("postcss", json!({ "sourceMap": true })),
            ],
        },
        RuleConfig {
            test: r"\.html$".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: vec![UseConfig::new("template")],
        },
        RuleConfig {
            test: r"\.json$".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: vec![UseConfig::new("json")],
        },
        RuleConfig {
            test: r"\.(js|mjs|cjs)$".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            uses: Vec::new(),
        },
    ]
}

pub fn default_copy_tasks() -> Vec<CopyConfig> {
    let task = |from: &str, to: &str| CopyConfig {
        from: from.to_string(),
        to: to.to_string(),
        ignore: Vec::new(),
        transform: None,
    };

    vec![
        task(
            "node_modules/@fortawesome/fontawesome-free/webfonts/fa-solid-900.woff*",
            "fonts/[name][ext]",
        ),
        task("client/js/loading-error-handlers.js", "js/[name][ext]"),
        CopyConfig {
            ignore: vec![
                "**/index.html.tpl".to_string(),
                "**/service-worker.js".to_string(),
            ],
            ..task("client/*", "[name][ext]")
        },
        CopyConfig {
            transform: Some(CopyTransformConfig::ReplacePlaceholder {
                token: CACHE_BUST_PLACEHOLDER.to_string(),
            }),
            ..task("client/service-worker.js", "[name][ext]")
        },
        task("client/audio/*", "audio/[name][ext]"),
        task("client/img/*", "img/[name][ext]"),
        task("client/themes/*", "themes/[name][ext]"),
    ]
}
