//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::UploadSummary;
use anyhow::Result;
use fnpack_core::BuildReport;
use fnpack_core::Destination;
use fnpack_core::LoadedArchive;
use fnpack_core::report::format_timestamp;
use serde::Serialize;
use std::io;
use std::io::Write;

pub struct JsonFormatter {
    to_stderr: bool,
}

#[derive(Serialize)]
struct BuildOutput {
    files_added: usize,
    symlinks_added: usize,
    files_excluded: usize,
    bytes_read: u64,
    archive_size: u64,
    compression_ratio: f64,
    duration_ms: u128,
}

impl From<&BuildReport> for BuildOutput {
    fn from(report: &BuildReport) -> Self {
        Self {
            files_added: report.files_added,
            symlinks_added: report.symlinks_added,
            files_excluded: report.files_excluded,
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl JsonFormatter {
    pub fn new(to_stderr: bool) -> Self {
        Self { to_stderr }
    }

    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        if self.to_stderr {
            writeln!(io::stderr(), "{json}")?;
        } else {
            writeln!(io::stdout(), "{json}")?;
        }
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_archive_result(
        &self,
        destination: &Destination,
        report: &BuildReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct ArchiveOutput {
            destination: String,
            #[serde(flatten)]
            build: BuildOutput,
        }

        let data = ArchiveOutput {
            destination: destination.to_string(),
            build: report.into(),
        };
        self.output(&JsonOutput::success("archive", data))
    }

    fn format_inspection(&self, archive: &LoadedArchive) -> Result<()> {
        #[derive(Serialize)]
        struct EntryOutput {
            name: String,
            size: u64,
            compressed_size: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            mode: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            modified: Option<String>,
            is_dir: bool,
            is_symlink: bool,
        }

        #[derive(Serialize)]
        struct InspectOutput {
            archive: String,
            size: u64,
            entries: Vec<EntryOutput>,
        }

        let data = InspectOutput {
            archive: archive.path.display().to_string(),
            size: archive.size,
            entries: archive
                .entries
                .iter()
                .map(|e| EntryOutput {
                    name: e.name.clone(),
                    size: e.size,
                    compressed_size: e.compressed_size,
                    mode: e.mode.map(|m| format!("{m:o}")),
                    modified: e.modified.map(format_timestamp),
                    is_dir: e.is_dir,
                    is_symlink: e.is_symlink(),
                })
                .collect(),
        };
        self.output(&JsonOutput::success("inspect", data))
    }

    fn format_upload_result(&self, summary: &UploadSummary) -> Result<()> {
        #[derive(Serialize)]
        struct UploadOutput {
            target: String,
            version: Option<String>,
            size: u64,
            prebuilt: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            build: Option<BuildOutput>,
        }

        let data = UploadOutput {
            target: summary.target.clone(),
            version: summary.version.clone(),
            size: summary.size,
            prebuilt: summary.report.is_none(),
            build: summary.report.as_ref().map(BuildOutput::from),
        };
        self.output(&JsonOutput::success("upload", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let _ = self.output(&JsonOutput::<()>::error(operation, format!("{error:#}")));
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let _ = self.output(&JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        ));
    }
}
