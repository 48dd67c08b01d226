//! Command implementations.
//!
//! - [`build`] - run a full build
//! - [`check`] - validate the configuration only

pub mod build;
pub mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;

use std::path::Path;

use kite_bundler::Bundler;
use kite_config::{ConfigLoader, ConfigOverrides, KiteConfig};
use kite_plugin_vue::VuePlugin;

use crate::error::{CliError, Result};

/// Load the layered configuration for the current directory.
pub(crate) fn load_config(config: Option<&Path>, overrides: ConfigOverrides) -> Result<KiteConfig> {
    let cwd = std::env::current_dir()?;
    let mut loader = ConfigLoader::new(&cwd).overrides(overrides);
    if let Some(path) = config {
        let explicit = cwd.join(path);
        if !explicit.is_file() {
            return Err(CliError::FileNotFound(explicit));
        }
        loader = loader.file(explicit);
    }

    if let Some(source) = loader.source()? {
        tracing::debug!(path = %source.path().display(), "using config file");
    }
    Ok(loader.load()?)
}

/// The bundler with the plugins every CLI build uses.
pub(crate) fn bundler(config: KiteConfig, mode: kite_config::BuildMode) -> Bundler {
    Bundler::new(config, mode).plugin(VuePlugin::new())
}
