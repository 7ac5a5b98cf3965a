//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::UploadSummary;
use anyhow::Result;
use console::Term;
use console::style;
use fnpack_core::BuildReport;
use fnpack_core::Destination;
use fnpack_core::LoadedArchive;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool, stdout_reserved: bool) -> Self {
        let (term, use_colors) = if stdout_reserved {
            (Term::stderr(), console::colors_enabled_stderr())
        } else {
            (Term::stdout(), console::colors_enabled())
        };
        Self {
            verbose,
            quiet,
            use_colors,
            term,
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn write_report(&self, report: &BuildReport) {
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        if report.symlinks_added > 0 {
            let _ = self.term.write_line(&format!(
                "  Symlinks:         {}",
                Self::format_number(report.symlinks_added)
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Files excluded:   {}",
            Self::format_number(report.files_excluded)
        ));
        let _ = self.term.write_line(&format!(
            "  Input size:       {}",
            Self::format_size(report.bytes_read)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));

        if self.verbose {
            if report.compression_ratio() > 0.0 {
                let _ = self.term.write_line(&format!(
                    "  Compression:      {:.1}x",
                    report.compression_ratio()
                ));
            }
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_archive_result(
        &self,
        destination: &Destination,
        report: &BuildReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let target = match destination {
            Destination::Stdout => "stdout".to_string(),
            Destination::File(path) => path.display().to_string(),
        };
        self.headline(&format!("Archive written to {target}"));
        let _ = self.term.write_line("");
        self.write_report(report);

        Ok(())
    }

    fn format_inspection(&self, archive: &LoadedArchive) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &archive.entries {
            if self.verbose {
                let _ = self.term.write_line(&format!(
                    "{} ({} compressed)",
                    entry.listing_line(),
                    Self::format_size(entry.compressed_size)
                ));
            } else {
                let _ = self.term.write_line(&entry.listing_line());
            }
        }

        let uncompressed: u64 = archive.entries.iter().map(|e| e.size).sum();
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {} ({} on disk)",
            Self::format_number(archive.entries.len()),
            Self::format_size(uncompressed),
            Self::format_size(archive.size)
        ));

        Ok(())
    }

    fn format_upload_result(&self, summary: &UploadSummary) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Uploaded {}", summary.target));
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Version:          {}",
            summary.version.as_deref().unwrap_or("(not versioned)")
        ));
        let _ = self.term.write_line(&format!(
            "  Artifact size:    {}",
            Self::format_size(summary.size)
        ));
        match &summary.report {
            Some(report) => self.write_report(report),
            None => {
                let _ = self.term.write_line("  Source:           pre-built archive");
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, _error: &anyhow::Error) {
        // anyhow prints the error chain to stderr when main returns.
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1536 * 1024 * 1024), "1.5 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}
