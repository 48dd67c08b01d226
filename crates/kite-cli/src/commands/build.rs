//! `kite build`.

use std::time::Instant;

use kite_config::{BuildMode, ConfigOverrides};

use crate::cli::BuildArgs;
use crate::commands::{bundler, load_config};
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// 1. Resolve the build mode (`--mode`, else `NODE_ENV`)
/// 2. Load the layered configuration with the flags as overrides
/// 3. Run the bundler with the Vue plugin registered
/// 4. Print the summary of emitted files
pub fn execute(args: BuildArgs) -> Result<()> {
    let started = Instant::now();
    let mode = args.mode.map(BuildMode::from).unwrap_or_else(BuildMode::from_env);

    let config = load_config(args.config.as_deref(), overrides(&args))?;
    ui::info(&format!(
        "Building {} ({mode}) into {}",
        config.entry.name,
        config.output_path().display()
    ));

    let manifest = bundler(config, mode).build()?;

    ui::print_build_summary(&manifest, started.elapsed());
    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}

/// Flags that take precedence over file and environment values. Boolean
/// flags only override when given.
fn overrides(args: &BuildArgs) -> ConfigOverrides {
    ConfigOverrides {
        output_dir: args.out_dir.clone(),
        version: args.version_id.clone(),
        source_maps: None,
        manifest: args.manifest.then_some(true),
        clean: args.clean.then_some(true),
    }
}
