//! Runs the `kite` binary against temporary projects.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const KITE_TOML: &str = r#"
version = "v5"
copy = []
substitutions = []

[entry]
name = "js/bundle.js"
sources = ["client/main.ts"]
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project using the default rules, the `~/*` alias and a component.
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "kite.toml", KITE_TOML);
    write(
        root,
        "client/tsconfig.json",
        r#"{ "compilerOptions": { "paths": { "~/*": ["*"] } } }"#,
    );
    write(
        root,
        "client/main.ts",
        "import './main.css';\nimport Hello from '~/components/Hello.vue';\n\nconst who: string = 'kite';\nconsole.log(Hello, who);\n",
    );
    write(root, "client/main.css", "body {\n  margin: 0;\n}\n");
    write(
        root,
        "client/components/Hello.vue",
        "<template><p>hello</p></template>\n<script>\nexport default { name: 'Hello' };\n</script>\n",
    );
    dir
}

fn kite(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("kite");
    cmd.current_dir(dir)
        .env_remove("NODE_ENV")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    kite(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build").and(predicate::str::contains("check")));
}

#[test]
fn production_build_writes_the_layout() {
    let dir = project();

    kite(dir.path())
        .args(["--no-color", "build", "--mode", "production"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Build Summary"))
        .stderr(predicate::str::contains("js/bundle.js"))
        .stderr(predicate::str::contains("css/style.css"));

    let bundle = fs::read_to_string(dir.path().join("public/js/bundle.js")).unwrap();
    assert!(bundle.contains("/* client/main.ts */"));
    assert!(bundle.contains("/* client/components/Hello.vue.js */"));
    assert!(!bundle.contains(": string"));
    assert!(!dir.path().join("public/js/bundle.js.map").exists());

    let css = fs::read_to_string(dir.path().join("public/css/style.css")).unwrap();
    assert!(css.contains("margin:0"), "css was: {css}");
}

#[test]
fn flags_override_the_config_file() {
    let dir = project();

    kite(dir.path())
        .args(["build", "-m", "development", "--out-dir", "dist", "--manifest"])
        .assert()
        .success();

    assert!(!dir.path().join("public").exists());
    assert!(dir.path().join("dist/js/bundle.js.map").exists());
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("dist/manifest.json")).unwrap())
            .unwrap();
    let paths: Vec<&str> = manifest["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"js/bundle.js"));
}

#[test]
fn node_env_selects_the_mode() {
    let dir = project();

    kite(dir.path())
        .env("NODE_ENV", "production")
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("(production)"));
}

#[test]
fn check_accepts_a_valid_project() {
    let dir = project();

    kite(dir.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration is valid"));
    assert!(!dir.path().join("public").exists());
}

#[test]
fn check_reports_a_missing_config_file() {
    let dir = project();

    kite(dir.path())
        .args(["check", "--config", "missing.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn check_rejects_a_missing_entry() {
    let dir = project();
    fs::remove_file(dir.path().join("client/main.ts")).unwrap();

    kite(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration stage failed"));
}

#[test]
fn failed_build_names_its_stage() {
    let dir = project();
    write(dir.path(), "client/main.ts", "import './nowhere';\n");

    kite(dir.path())
        .args(["build", "--mode", "development"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resolve stage failed"));
    assert!(!dir.path().join("public/js/bundle.js").exists());
}
