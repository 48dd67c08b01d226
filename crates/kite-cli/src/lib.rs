//! kite CLI - declarative client asset builds from the command line.
//!
//! The binary is a thin layer over [`kite_bundler`]:
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `build` and `check`
//! - [`error`] - [`CliError`] and its miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary
//!
//! Configuration is layered by [`kite_config::ConfigLoader`]: defaults, then
//! `kite.toml` (or the `"kite"` field of `package.json`), then `KITE_*`
//! environment variables, then command-line flags.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
