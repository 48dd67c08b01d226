//! Miette rendering of CLI errors.

use miette::{MietteDiagnostic, Report};

use crate::error::CliError;

/// Convert a [`CliError`] into a report for `main` to print.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::Config(e) => {
            let mut diagnostic =
                MietteDiagnostic::new(format!("Configuration error: {e}")).with_code("CONFIG_ERROR");
            if let Some(hint) = e.hint() {
                diagnostic = diagnostic.with_help(hint);
            }
            Report::new(diagnostic)
        }
        other => miette::miette!("{}", other),
    }
}
