//! Error handling for the kite CLI.
//!
//! Commands return [`CliError`]. `main` turns it into a [`miette::Report`]
//! through [`cli_error_to_miette`], which keeps the diagnostic code and help
//! text of bundler errors.

mod report;

use std::path::PathBuf;

use kite_bundler::BuildError;
use kite_config::ConfigError;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A build stage failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
