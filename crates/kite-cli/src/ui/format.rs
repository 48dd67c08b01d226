//! Sizes, durations and the build summary table.

use std::time::Duration;

use console::Term;
use kite_bundler::OutputManifest;
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Human-readable size (B, KB, MB, GB).
///
/// ```
/// use kite_cli::ui::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Human-readable duration (ms, s, m s).
///
/// ```
/// use std::time::Duration;
/// use kite_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print every emitted file with its size, then the totals.
pub fn print_build_summary(manifest: &OutputManifest, elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let name_width = manifest.files.iter().map(|f| f.path.len()).max().unwrap_or(0);
    let color = colors_enabled();

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for file in &manifest.files {
        let name = format!("{:<name_width$}", file.path);
        let size = format_size(file.size);
        let kind = file.kind.to_string();
        if color {
            eprintln!(
                "  {} {} {:>10} {}",
                "▸".blue(),
                name.bright_white().bold(),
                size.dimmed(),
                kind.dimmed()
            );
        } else {
            eprintln!("  ▸ {name} {size:>10} {kind}");
        }
    }

    eprintln!("{}", "─".repeat(width));
    let total = format!(
        "{} files, {}",
        manifest.len(),
        format_size(manifest.total_size())
    );
    let time = format_duration(elapsed);
    if color {
        eprintln!("  {} {} in {}", "Total:".bold(), total.green(), time.green());
    } else {
        eprintln!("  Total: {total} in {time}");
    }
}
