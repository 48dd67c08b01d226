use clap::ValueEnum;
use kite_config::BuildMode;

/// Build mode selected on the command line
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ModeArg {
    /// Minified output, version cache-bust token, no source maps
    #[value(name = "production", alias = "prod")]
    Production,

    /// Readable output with source maps and the `dev` cache-bust marker
    #[value(name = "development", alias = "dev")]
    Development,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Production => BuildMode::Production,
            ModeArg::Development => BuildMode::Development,
        }
    }
}
