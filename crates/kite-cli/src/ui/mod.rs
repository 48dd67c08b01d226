//! Terminal output: status lines and the build summary.
//!
//! Everything goes to stderr so stdout stays free for piping.

use std::sync::atomic::{AtomicBool, Ordering};

mod format;
mod messages;

static COLORS: AtomicBool = AtomicBool::new(false);

pub use format::{format_duration, format_size, print_build_summary};
pub use messages::{error, info, success, warning};

/// Whether colored output should be used.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise stderr
/// must be a terminal.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status output is colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
