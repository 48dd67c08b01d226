use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::ModeArg;

/// Available kite subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the client assets
    ///
    /// Resolves the entry sources, runs every module through its loader
    /// rule, splits third-party code into the vendor chunk, copies static
    /// assets and writes everything to the output directory.
    Build(BuildArgs),

    /// Validate the configuration
    ///
    /// Loads the layered configuration and checks it the way a build would
    /// before processing any file. Nothing is written.
    Check(CheckArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Config file to use instead of discovering kite.toml or package.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build mode
    ///
    /// Defaults to production when NODE_ENV is `production`, development
    /// otherwise.
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Version identifier substituted for cache-bust placeholders
    ///
    /// Takes precedence over the `version` config field and the version
    /// file. Only used in production builds.
    #[arg(long, value_name = "ID")]
    pub version_id: Option<String>,

    /// Output directory, relative to the project root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Remove everything in the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Write manifest.json listing every emitted file
    #[arg(long)]
    pub manifest: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Config file to use instead of discovering kite.toml or package.json
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mode to validate for (production also requires a version)
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,
}
