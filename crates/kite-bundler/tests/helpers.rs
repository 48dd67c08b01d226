//! Shared test utilities for kite-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use kite_bundler::kite_config::{
    CopyConfig, CopyTransformConfig, EntryConfig, KiteConfig, ResolveConfig,
};
use tempfile::TempDir;

/// Writes `files` (root-relative path, content) under the temp dir.
pub fn create_test_project(dir: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = dir.path().to_path_buf();
    for (rel, content) in files {
        write_file(&root, rel, content.as_bytes());
    }
    root
}

pub fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read_output(root: &Path, rel: &str) -> String {
    let path = root.join("public").join(rel);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// The reference layout reduced to one entry script: the default rules,
/// image and service worker copies, no alias manifest, version `v7`.
pub fn scenario_config(root: &Path) -> KiteConfig {
    KiteConfig {
        root: root.to_path_buf(),
        entry: EntryConfig {
            name: "js/bundle.js".into(),
            sources: vec!["client/a.ts".into()],
        },
        resolve: ResolveConfig {
            alias_manifest: None,
            base_url: None,
            ..ResolveConfig::default()
        },
        copy: vec![
            copy_task("client/img/*", "img/[name][ext]"),
            CopyConfig {
                transform: Some(CopyTransformConfig::ReplacePlaceholder {
                    token: "__HASH__".into(),
                }),
                ..copy_task("client/sw.js", "[name][ext]")
            },
        ],
        substitutions: Vec::new(),
        version: Some("v7".into()),
        ..KiteConfig::default()
    }
}

pub fn copy_task(from: &str, to: &str) -> CopyConfig {
    CopyConfig {
        from: from.into(),
        to: to.into(),
        ignore: Vec::new(),
        transform: None,
    }
}

/// The four-file project: script, stylesheet, image and service worker.
pub fn scenario_files() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "client/a.ts",
            "import './a.css';\n\nconst greeting: string = \"hello from a\";\nconsole.log(greeting);\n",
        ),
        ("client/a.css", ".a {\n  color: red;\n}\n"),
        ("client/img/logo.png", "\u{89}PNG fake image bytes"),
        (
            "client/sw.js",
            "const CACHE = 'kite-__HASH__';\nself.addEventListener('install', () => caches.open(CACHE));\n",
        ),
    ]
}
