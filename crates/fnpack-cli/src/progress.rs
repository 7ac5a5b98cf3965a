//! Progress spinner for CLI builds.

use console::Term;
use fnpack_core::BuildObserver;
use fnpack_core::BuildReport;
use fnpack_core::report::AddedEntry;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;

/// Spinner implementing `BuildObserver`.
///
/// Shows the number of entries written and the uncompressed bytes read so
/// far. Draws on stderr and cleans up on drop.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_read: u64,
}

impl CliProgress {
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Template: "⠙ Packaging ./function 42 files (15.2 MB)"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {prefix} {pos} files ({msg})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(humanize_bytes(0));
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, bytes_read: 0 }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl BuildObserver for CliProgress {
    fn on_build_started(&mut self, source: &Path) {
        self.bar.set_prefix(format!("Packaging {}", source.display()));
    }

    fn on_entry_skipped(&mut self, _relative_path: &str) {}

    fn on_entry_added(&mut self, entry: &AddedEntry<'_>) {
        self.bytes_read += entry.size;
        self.bar.inc(1);
        self.bar.set_message(humanize_bytes(self.bytes_read));
    }

    fn on_build_finished(&mut self, _report: &BuildReport) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
