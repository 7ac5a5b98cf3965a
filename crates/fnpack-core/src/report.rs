//! Build reporting and observation.

use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Statistics about a finished build.
///
/// # Examples
///
/// ```
/// use fnpack_core::BuildReport;
///
/// let mut report = BuildReport::default();
/// report.bytes_read = 1000;
/// report.archive_size = 250;
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files written as archive entries.
    pub files_added: usize,

    /// Symlinks written as symlink entries.
    pub symlinks_added: usize,

    /// Entries left out because they matched an exclude pattern.
    pub files_excluded: usize,

    /// Uncompressed bytes copied into the archive.
    pub bytes_read: u64,

    /// Size of the finalized archive in bytes.
    pub archive_size: u64,

    /// Wall-clock build time.
    pub duration: Duration,
}

impl BuildReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries written (files and symlinks).
    #[must_use]
    pub fn entries_written(&self) -> usize {
        self.files_added + self.symlinks_added
    }

    /// Uncompressed / archive size. Returns 0.0 when either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.archive_size == 0 || self.bytes_read == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.archive_size as f64
    }
}

/// Metadata of an entry that was just written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedEntry<'a> {
    /// Entry name inside the archive.
    pub name: &'a str,

    /// Unix permission bits.
    pub mode: u32,

    /// Uncompressed size.
    pub size: u64,

    /// Modification time recorded for the entry.
    pub modified: Option<SystemTime>,

    /// `true` for preserved symlinks.
    pub is_symlink: bool,
}

/// Receives notifications at well-defined points of an archive build.
///
/// Implementations replace direct log output in the builder, so the build
/// can be observed (or silenced) without capturing console output.
pub trait BuildObserver {
    /// Called once before the first entry is read.
    fn on_build_started(&mut self, source: &Path);

    /// Called for each entry left out by an exclude pattern.
    fn on_entry_skipped(&mut self, relative_path: &str);

    /// Called after an entry has been fully written.
    fn on_entry_added(&mut self, entry: &AddedEntry<'_>);

    /// Called once after the archive has been finalized.
    fn on_build_finished(&mut self, report: &BuildReport);
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {
    fn on_build_started(&mut self, _source: &Path) {}

    fn on_entry_skipped(&mut self, _relative_path: &str) {}

    fn on_entry_added(&mut self, _entry: &AddedEntry<'_>) {}

    fn on_build_finished(&mut self, _report: &BuildReport) {}
}

/// Observer that emits `tracing` events.
///
/// Build start and finish are logged at `info`, each added entry at `debug`
/// as `mode size mtime name`, and exclusions at `trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BuildObserver for TracingObserver {
    fn on_build_started(&mut self, source: &Path) {
        tracing::info!("creating zip archive from {}", source.display());
    }

    fn on_entry_skipped(&mut self, relative_path: &str) {
        tracing::trace!("skipping {relative_path}");
    }

    fn on_entry_added(&mut self, entry: &AddedEntry<'_>) {
        tracing::debug!(
            "{} {:>10} {} {}",
            format_mode(entry.mode, entry.is_symlink),
            entry.size,
            entry
                .modified
                .map(OffsetDateTime::from)
                .map_or_else(|| "-".to_string(), format_timestamp),
            entry.name
        );
    }

    fn on_build_finished(&mut self, report: &BuildReport) {
        tracing::info!(
            files = report.files_added,
            excluded = report.files_excluded,
            "zip archive wrote {} bytes",
            report.archive_size
        );
    }
}

impl<A: BuildObserver, B: BuildObserver> BuildObserver for (A, B) {
    fn on_build_started(&mut self, source: &Path) {
        self.0.on_build_started(source);
        self.1.on_build_started(source);
    }

    fn on_entry_skipped(&mut self, relative_path: &str) {
        self.0.on_entry_skipped(relative_path);
        self.1.on_entry_skipped(relative_path);
    }

    fn on_entry_added(&mut self, entry: &AddedEntry<'_>) {
        self.0.on_entry_added(entry);
        self.1.on_entry_added(entry);
    }

    fn on_build_finished(&mut self, report: &BuildReport) {
        self.0.on_build_finished(report);
        self.1.on_build_finished(report);
    }
}

/// Renders permission bits in `ls -l` style, e.g. `-rwxr-xr-x`.
///
/// # Examples
///
/// ```
/// use fnpack_core::report::format_mode;
///
/// assert_eq!(format_mode(0o755, false), "-rwxr-xr-x");
/// assert_eq!(format_mode(0o777, true), "Lrwxrwxrwx");
/// ```
#[must_use]
pub fn format_mode(mode: u32, is_symlink: bool) -> String {
    const FLAGS: [char; 9] = ['r', 'w', 'x', 'r', 'w', 'x', 'r', 'w', 'x'];

    let mut out = String::with_capacity(10);
    out.push(if is_symlink { 'L' } else { '-' });
    for (i, flag) in FLAGS.iter().enumerate() {
        let bit = 1 << (8 - i);
        out.push(if mode & bit == 0 { '-' } else { *flag });
    }
    out
}

/// Formats a timestamp as RFC 3339, falling back to `-`.
#[must_use]
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_compression_ratio_edge_cases() {
        let mut report = BuildReport::new();
        assert!(report.compression_ratio().abs() < f64::EPSILON);

        report.bytes_read = 100;
        assert!(report.compression_ratio().abs() < f64::EPSILON);

        report.archive_size = 50;
        assert!((report.compression_ratio() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entries_written() {
        let report = BuildReport {
            files_added: 3,
            symlinks_added: 2,
            ..BuildReport::default()
        };
        assert_eq!(report.entries_written(), 5);
    }

    #[test]
    fn test_format_mode() {
        assert_eq!(format_mode(0o644, false), "-rw-r--r--");
        assert_eq!(format_mode(0o600, false), "-rw-------");
        assert_eq!(format_mode(0o100_755, false), "-rwxr-xr-x");
        assert_eq!(format_mode(0, false), "----------");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(datetime!(2024-03-01 12:30:00 UTC)),
            "2024-03-01T12:30:00Z"
        );
    }

    #[derive(Default)]
    struct Counter {
        started: usize,
        skipped: usize,
        added: usize,
        finished: usize,
    }

    impl BuildObserver for Counter {
        fn on_build_started(&mut self, _source: &Path) {
            self.started += 1;
        }

        fn on_entry_skipped(&mut self, _relative_path: &str) {
            self.skipped += 1;
        }

        fn on_entry_added(&mut self, _entry: &AddedEntry<'_>) {
            self.added += 1;
        }

        fn on_build_finished(&mut self, _report: &BuildReport) {
            self.finished += 1;
        }
    }

    #[test]
    fn test_pair_observer_forwards_to_both() {
        let mut pair = (Counter::default(), Counter::default());
        pair.on_build_started(Path::new("."));
        pair.on_entry_skipped("a.log");
        pair.on_entry_added(&AddedEntry {
            name: "a.txt",
            mode: 0o644,
            size: 1,
            modified: None,
            is_symlink: false,
        });
        pair.on_build_finished(&BuildReport::default());

        for counter in [&pair.0, &pair.1] {
            assert_eq!(counter.started, 1);
            assert_eq!(counter.skipped, 1);
            assert_eq!(counter.added, 1);
            assert_eq!(counter.finished, 1);
        }
    }
}
