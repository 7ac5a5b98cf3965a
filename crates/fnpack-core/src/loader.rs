//! Loading pre-built zip archives.
//!
//! The loader does not transform anything: it checks that a file opens as a
//! well-formed zip, lists its entries for auditing, and hands back a fresh
//! handle to the unchanged bytes.

use crate::PackError;
use crate::Result;
use crate::report::format_mode;
use crate::report::format_timestamp;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Metadata of one entry in an existing archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntryInfo {
    /// Entry name as stored.
    pub name: String,

    /// Uncompressed size in bytes.
    pub size: u64,

    /// Compressed size in bytes.
    pub compressed_size: u64,

    /// Unix mode, when the archive recorded one.
    pub mode: Option<u32>,

    /// Modification time (interpreted as UTC), when valid.
    pub modified: Option<OffsetDateTime>,

    /// `true` for directory entries (`name` ends with `/`).
    pub is_dir: bool,
}

impl ArchiveEntryInfo {
    /// Returns `true` if the recorded mode marks a symlink.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK)
    }

    /// Renders the entry as `mode size mtime name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnpack_core::loader::ArchiveEntryInfo;
    ///
    /// let info = ArchiveEntryInfo {
    ///     name: "handler.py".to_string(),
    ///     size: 42,
    ///     compressed_size: 30,
    ///     mode: Some(0o100_644),
    ///     modified: None,
    ///     is_dir: false,
    /// };
    /// assert_eq!(info.listing_line(), "-rw-r--r--         42 - handler.py");
    /// ```
    #[must_use]
    pub fn listing_line(&self) -> String {
        format!(
            "{} {:>10} {} {}",
            format_mode(self.mode.unwrap_or(0o644), self.is_symlink()),
            self.size,
            self.modified.map_or_else(|| "-".to_string(), format_timestamp),
            self.name
        )
    }
}

/// An existing archive that passed validation.
#[derive(Debug)]
pub struct LoadedArchive {
    /// Path the archive was loaded from.
    pub path: PathBuf,

    /// Fresh handle positioned at offset 0.
    pub file: File,

    /// Total file size in bytes.
    pub size: u64,

    /// Entries in central-directory order.
    pub entries: Vec<ArchiveEntryInfo>,
}

impl Read for LoadedArchive {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

/// Validates and reopens an existing zip archive.
///
/// # Errors
///
/// Returns [`PackError::InvalidArchive`] if the file is not a well-formed
/// zip (truncated, corrupted, or a different format), and
/// [`PackError::Read`] if it cannot be opened or inspected at all.
///
/// # Examples
///
/// ```no_run
/// use fnpack_core::load_archive;
///
/// let loaded = load_archive("function.zip")?;
/// for entry in &loaded.entries {
///     println!("{}", entry.listing_line());
/// }
/// # Ok::<(), fnpack_core::PackError>(())
/// ```
pub fn load_archive(path: impl AsRef<Path>) -> Result<LoadedArchive> {
    let path = path.as_ref();
    tracing::info!("reading zip archive from {}", path.display());

    let read_error = |source| PackError::Read {
        path: path.to_path_buf(),
        source,
    };

    let entries = {
        let file = File::open(path).map_err(read_error)?;
        list_entries(file).map_err(|e| match e {
            PackError::InvalidArchive { reason, .. } => PackError::InvalidArchive {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?
    };
    for entry in &entries {
        tracing::debug!("{}", entry.listing_line());
    }

    let file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();
    tracing::info!("zip archive {size} bytes");

    Ok(LoadedArchive {
        path: path.to_path_buf(),
        file,
        size,
        entries,
    })
}

/// Lists the entries of a zip archive read from any seekable reader.
///
/// # Errors
///
/// Returns [`PackError::InvalidArchive`] (with an empty path) if the data is
/// not a well-formed zip.
pub fn list_entries<R: Read + Seek>(reader: R) -> Result<Vec<ArchiveEntryInfo>> {
    let invalid = |reason: String| PackError::InvalidArchive {
        path: PathBuf::new(),
        reason,
    };

    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| invalid(format!("failed to open: {e}")))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| invalid(format!("failed to read entry {i}: {e}")))?;

        entries.push(ArchiveEntryInfo {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            mode: entry.unix_mode(),
            modified: entry.last_modified().and_then(to_offset_datetime),
            is_dir: entry.is_dir(),
        });
    }

    Ok(entries)
}

fn to_offset_datetime(dt: zip::DateTime) -> Option<OffsetDateTime> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(i32::from(dt.year()), month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o640)
            .last_modified_time(zip::DateTime::from_date_and_time(2024, 5, 6, 7, 8, 10).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_load_valid_archive() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("function.zip");
        write_zip(
            &path,
            &[
                ("handler.py", b"print(1)".as_slice()),
                ("lib/util.py", b"x = 2".as_slice()),
            ],
        );

        let mut loaded = load_archive(&path).unwrap();
        assert_eq!(loaded.size, fs::metadata(&path).unwrap().len());
        assert_eq!(loaded.entries.len(), 2);

        let handler = &loaded.entries[0];
        assert_eq!(handler.name, "handler.py");
        assert_eq!(handler.size, 8);
        assert_eq!(handler.mode.unwrap() & 0o777, 0o640);
        assert!(!handler.is_dir);
        assert!(!handler.is_symlink());
        assert_eq!(
            handler.modified.map(format_timestamp).unwrap(),
            "2024-05-06T07:08:10Z"
        );

        let mut bytes = Vec::new();
        loaded.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, fs::read(&path).unwrap());
    }

    #[test]
    fn test_load_truncated_archive_is_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("function.zip");
        write_zip(&path, &[("handler.py", b"print(1)".as_slice())]);

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let err = load_archive(&path).unwrap_err();
        assert!(err.is_malformed_archive());
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_non_zip_is_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.zip");
        fs::write(&path, "this is plain text, not an archive").unwrap();

        let err = load_archive(&path).unwrap_err();
        assert!(matches!(err, PackError::InvalidArchive { .. }));
    }

    #[test]
    fn test_load_empty_file_is_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.zip");
        fs::write(&path, b"").unwrap();

        assert!(load_archive(&path).unwrap_err().is_malformed_archive());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = load_archive("/nonexistent/function.zip").unwrap_err();
        assert!(matches!(err, PackError::Read { .. }));
    }

    #[test]
    fn test_list_entries_from_memory() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory("lib/", SimpleFileOptions::default())
            .unwrap();
        zip.start_file("lib/a.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"abc").unwrap();
        let cursor = zip.finish().unwrap();

        let entries = list_entries(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_dir);
        assert_eq!(entries[1].name, "lib/a.txt");
        assert_eq!(entries[1].size, 3);
    }

    #[test]
    fn test_to_offset_datetime_dos_epoch() {
        let dt = zip::DateTime::default();
        assert_eq!(
            to_offset_datetime(dt).map(format_timestamp).unwrap(),
            "1980-01-01T00:00:00Z"
        );
    }
}
