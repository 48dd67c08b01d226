//! `kite check`.
//!
//! Loads the configuration and runs the build's configuration stage:
//! filesystem validation, version lookup, rule and plugin compilation.
//! No module is read and nothing is written.

use kite_config::{BuildMode, ConfigOverrides, resolve_version};

use crate::cli::CheckArgs;
use crate::commands::{bundler, load_config};
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");
    let mode = args.mode.map(BuildMode::from).unwrap_or_else(BuildMode::from_env);
    let config = load_config(args.config.as_deref(), ConfigOverrides::default())?;

    ui::info(&format!(
        "{} entry source(s), {} rule(s), {} copy task(s), {} substitution(s)",
        config.entry.sources.len(),
        config.rules.len(),
        config.copy.len(),
        config.substitutions.len()
    ));
    match resolve_version(&config)? {
        Some(version) => ui::info(&format!("Version: {version}")),
        None if mode.is_production() => {
            ui::warning("No version found: production cache-bust placeholders cannot be filled");
        }
        None => {}
    }

    bundler(config, mode).check()?;
    ui::success(&format!("Configuration is valid for {mode} builds"));
    Ok(())
}
