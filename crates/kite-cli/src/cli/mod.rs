//! Command-line interface definition.
//!
//! - `kite build` - run a full build
//! - `kite check` - load and validate the configuration without building

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command};
pub use enums::ModeArg;

/// kite - a declarative client asset bundler
#[derive(Parser, Debug)]
#[command(
    name = "kite",
    version,
    about = "A declarative client asset bundler",
    long_about = "kite bundles the scripts, stylesheets and static assets of a web client\n\
                  into a fixed output layout, driven by loader rules, substitutions and\n\
                  copy tasks declared in kite.toml."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
