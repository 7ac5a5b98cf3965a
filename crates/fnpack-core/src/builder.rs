//! Zip artifact construction.
//!
//! The builder streams every included source file into a deflate-compressed
//! zip held in an anonymous temporary file. On success the caller receives an
//! [`Artifact`] that owns the temporary file, rewound to offset 0. On failure
//! the temporary file is dropped before the error is returned, so nothing is
//! left for the caller to clean up.

use crate::CancelToken;
use crate::PackConfig;
use crate::PackError;
use crate::Result;
use crate::filter::PathFilter;
use crate::report::AddedEntry;
use crate::report::BuildObserver;
use crate::report::BuildReport;
use crate::report::TracingObserver;
use crate::walker::EntryKind;
use crate::walker::FsTree;
use crate::walker::SourceEntry;
use crate::walker::SourceTree;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use std::time::SystemTime;
use time::OffsetDateTime;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// A finalized zip archive backed by an anonymous temporary file.
///
/// The handle is positioned at offset 0 when returned by the builder.
/// Dropping it closes and releases the temporary file.
#[derive(Debug)]
pub struct Artifact {
    file: File,
    size: u64,
    report: BuildReport,
}

impl Artifact {
    pub(crate) fn new(file: File, size: u64, report: BuildReport) -> Self {
        Self { file, size, report }
    }

    /// Total archive size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Statistics collected while building.
    #[must_use]
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Seeks back to the first byte.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the seek fails.
    pub fn rewind(&mut self) -> Result<()> {
        self.file.rewind()?;
        Ok(())
    }

    /// Consumes the artifact, returning the underlying file handle.
    #[must_use]
    pub fn into_file(self) -> File {
        self.file
    }
}

impl Read for Artifact {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for Artifact {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Builds zip artifacts from a source tree.
///
/// One builder can run any number of sequential builds; each build gets its
/// own temporary file.
///
/// # Examples
///
/// ```no_run
/// use fnpack_core::ArchiveBuilder;
/// use fnpack_core::PackConfig;
///
/// let config = PackConfig::default().with_extra_excludes(["*.log"]);
/// let artifact = ArchiveBuilder::new(config).build("./function")?;
/// println!("{} bytes", artifact.size());
/// # Ok::<(), fnpack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    config: PackConfig,
    filter: PathFilter,
    cancel: Option<CancelToken>,
}

impl ArchiveBuilder {
    /// Creates a builder for the given configuration.
    #[must_use]
    pub fn new(config: PackConfig) -> Self {
        let filter = config.path_filter();
        Self {
            config,
            filter,
            cancel: None,
        }
    }

    /// Attaches a cancellation token checked before each entry.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds an artifact from a directory or a single file, logging
    /// through `tracing`.
    ///
    /// A single file becomes the only entry, named by its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not exist, the walk fails, any
    /// source file cannot be read, or the archive cannot be written.
    pub fn build(&self, source: impl AsRef<Path>) -> Result<Artifact> {
        self.build_with_observer(source, &mut TracingObserver)
    }

    /// Same as [`build`](Self::build) with a caller-supplied observer.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_observer(
        &self,
        source: impl AsRef<Path>,
        observer: &mut dyn BuildObserver,
    ) -> Result<Artifact> {
        let tree = FsTree::new(source.as_ref(), self.config.symlinks)?;
        self.build_tree(&tree, observer)
    }

    /// Builds an artifact from any source tree.
    ///
    /// # Errors
    ///
    /// Returns the first traversal, read, or write error. The build stops at
    /// that point and the temporary file is released.
    pub fn build_tree(
        &self,
        tree: &dyn SourceTree,
        observer: &mut dyn BuildObserver,
    ) -> Result<Artifact> {
        self.config.validate()?;

        let start = Instant::now();
        observer.on_build_started(tree.root());

        let sink = self.temp_file()?;
        let mut zip = ZipWriter::new(sink);
        let mut report = BuildReport::default();
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.config.compression_level)));
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

        for entry in tree.entries() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(PackError::Cancelled);
            }

            let entry = entry?;
            if entry.is_dir() {
                continue;
            }

            if self.filter.is_excluded(&entry.relative_path) {
                report.files_excluded += 1;
                observer.on_entry_skipped(&entry.relative_path);
                continue;
            }

            match &entry.kind {
                EntryKind::File => {
                    let size = add_file(&mut zip, tree, &entry, options, &mut buffer)?;
                    report.files_added += 1;
                    report.bytes_read += size;
                    observer.on_entry_added(&AddedEntry {
                        name: &entry.relative_path,
                        mode: entry.mode,
                        size,
                        modified: entry.modified,
                        is_symlink: false,
                    });
                }
                EntryKind::Symlink { target } => {
                    let target = target.to_string_lossy().into_owned();
                    add_symlink(&mut zip, &entry, &target, options)?;
                    report.symlinks_added += 1;
                    observer.on_entry_added(&AddedEntry {
                        name: &entry.relative_path,
                        mode: 0o777,
                        size: target.len() as u64,
                        modified: entry.modified,
                        is_symlink: true,
                    });
                }
                EntryKind::Directory => {}
            }
        }

        let mut sink = zip
            .finish()
            .map_err(|e| PackError::Finalize(e.to_string()))?;
        let size = sink.seek(SeekFrom::End(0)).map_err(PackError::TempFile)?;
        sink.rewind().map_err(PackError::TempFile)?;

        report.archive_size = size;
        report.duration = start.elapsed();
        observer.on_build_finished(&report);

        Ok(Artifact::new(sink, size, report))
    }

    fn temp_file(&self) -> Result<File> {
        match &self.config.temp_dir {
            Some(dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
        .map_err(PackError::TempFile)
    }
}

/// Streams one source file into a new deflate entry. Returns the number of
/// uncompressed bytes copied.
fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    tree: &dyn SourceTree,
    entry: &SourceEntry,
    options: SimpleFileOptions,
    buffer: &mut [u8],
) -> Result<u64> {
    let name = entry_name(entry)?;
    let mut reader = tree.open(entry)?;

    // Zip64 sizes must be announced before the data for files past 4 GiB.
    let options = options
        .unix_permissions(entry.mode)
        .last_modified_time(zip_datetime(entry.modified))
        .large_file(entry.size >= u64::from(u32::MAX));
    zip.start_file(name, options).map_err(|e| PackError::Write {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let mut copied = 0u64;
    loop {
        let read = reader.read(buffer).map_err(|source| PackError::Read {
            path: entry.path.clone(),
            source,
        })?;
        if read == 0 {
            break;
        }
        zip.write_all(&buffer[..read])
            .map_err(|e| PackError::Write {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        copied += read as u64;
    }

    Ok(copied)
}

fn add_symlink<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &SourceEntry,
    target: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let name = entry_name(entry)?;
    let options = options.last_modified_time(zip_datetime(entry.modified));
    zip.add_symlink(name, target, options)
        .map_err(|e| PackError::Write {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

fn entry_name(entry: &SourceEntry) -> Result<&str> {
    if entry.relative_path.is_empty() {
        return Err(PackError::Write {
            name: String::new(),
            reason: format!("entry {} has no relative name", entry.path.display()),
        });
    }
    Ok(&entry.relative_path)
}

/// Converts a modification time to a zip timestamp (UTC).
///
/// Times outside the DOS range (before 1980 or after 2107) fall back to
/// 1980-01-01 00:00:00.
fn zip_datetime(modified: Option<SystemTime>) -> DateTime {
    let Some(modified) = modified else {
        return DateTime::default();
    };
    let utc = OffsetDateTime::from(modified);
    let Ok(year) = u16::try_from(utc.year()) else {
        return DateTime::default();
    };
    DateTime::from_date_and_time(
        year,
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
    )
    .unwrap_or_default()
}
