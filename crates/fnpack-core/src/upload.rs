//! Upload sink collaborator.
//!
//! The builder's output is the sink's input and nothing else couples them.
//! Retries, credentials, and transport belong to the sink implementation.

use crate::PackError;
use crate::Result;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Bucket and key locating an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadTarget {
    /// Bucket (or container) name.
    pub bucket: String,

    /// Object key.
    pub key: String,
}

impl UploadTarget {
    /// Creates a target.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Object-storage style destination for artifacts.
pub trait UploadSink {
    /// Stores the bytes of `body` under `target`.
    ///
    /// Returns the version identifier assigned by the store, or `None` when
    /// the store does not version objects.
    fn put(&self, target: &UploadTarget, body: &mut dyn Read) -> Result<Option<String>>;
}

/// Rewinds `artifact` and uploads it to `sink`.
///
/// # Errors
///
/// Returns the sink's error, or an I/O error if the artifact cannot be
/// rewound.
pub fn upload_artifact<R: Read + Seek>(
    artifact: &mut R,
    sink: &dyn UploadSink,
    target: &UploadTarget,
) -> Result<Option<String>> {
    artifact.seek(SeekFrom::Start(0))?;
    tracing::debug!("uploading artifact to {target}");
    let version = sink.put(target, artifact)?;
    match &version {
        Some(version) => tracing::info!("uploaded {target} (version {version})"),
        None => tracing::info!("uploaded {target} (not versioned)"),
    }
    Ok(version)
}

/// Local object store laid out as `<root>/<bucket>/<key>`.
///
/// With versioning enabled, every upload is also kept as
/// `<key>.v<N>` and `N` (starting at 1) is returned as the version id.
///
/// # Examples
///
/// ```no_run
/// use fnpack_core::upload::{DirectorySink, UploadSink, UploadTarget};
///
/// let sink = DirectorySink::new("/srv/artifacts").with_versioning(true);
/// let version = sink.put(&UploadTarget::new("deploy", "fn/app.zip"), &mut &b"..."[..])?;
/// assert_eq!(version.as_deref(), Some("1"));
/// # Ok::<(), fnpack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    versioned: bool,
}

impl DirectorySink {
    /// Creates an unversioned store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            versioned: false,
        }
    }

    /// Enables or disables versioning.
    #[must_use]
    pub fn with_versioning(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    fn object_path(&self, target: &UploadTarget) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in [&target.bucket, &target.key] {
            let relative = Path::new(part.as_str());
            let valid = !part.is_empty()
                && relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !valid {
                return Err(PackError::Upload {
                    target: target.to_string(),
                    reason: format!("invalid path component: {part:?}"),
                });
            }
            path.push(relative);
        }
        Ok(path)
    }

    fn next_version(path: &Path) -> u64 {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return 1;
        };
        let prefix = format!("{name}.v");
        let Some(parent) = path.parent() else {
            return 1;
        };
        let Ok(dir) = fs::read_dir(parent) else {
            return 1;
        };
        dir.filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|n| n.strip_prefix(&prefix))
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .max()
            .map_or(1, |v| v + 1)
    }
}

impl UploadSink for DirectorySink {
    fn put(&self, target: &UploadTarget, body: &mut dyn Read) -> Result<Option<String>> {
        let upload_error = |e: std::io::Error| PackError::Upload {
            target: target.to_string(),
            reason: e.to_string(),
        };

        let path = self.object_path(target)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(upload_error)?;
        }

        let mut writer = BufWriter::new(File::create(&path).map_err(upload_error)?);
        std::io::copy(body, &mut writer).map_err(upload_error)?;
        writer.flush().map_err(upload_error)?;
        drop(writer);

        if !self.versioned {
            return Ok(None);
        }

        let version = Self::next_version(&path);
        let mut versioned = path.clone().into_os_string();
        versioned.push(format!(".v{version}"));
        fs::copy(&path, PathBuf::from(versioned)).map_err(upload_error)?;
        Ok(Some(version.to_string()))
    }
}
