//! Output formatter trait for CLI results.

use anyhow::Result;
use fnpack_core::BuildReport;
use fnpack_core::Destination;
use fnpack_core::LoadedArchive;
use serde::Serialize;

/// Outcome of an upload, independent of how the artifact was obtained.
#[derive(Debug)]
pub struct UploadSummary {
    pub target: String,
    pub version: Option<String>,
    pub size: u64,
    /// Build statistics, `None` when a pre-built archive was passed through.
    pub report: Option<BuildReport>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `archive`
    fn format_archive_result(&self, destination: &Destination, report: &BuildReport)
    -> Result<()>;

    /// Format the entry listing of `inspect`
    fn format_inspection(&self, archive: &LoadedArchive) -> Result<()>;

    /// Format the result of `upload`
    fn format_upload_result(&self, summary: &UploadSummary) -> Result<()>;

    /// Format a failed command
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
