//! Persisting an artifact to a local file or standard output.

use crate::PackError;
use crate::Result;
use std::fmt;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Where an artifact is written when it is not uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,

    /// A local file. An existing file is replaced only once the whole
    /// artifact has been written.
    File(PathBuf),
}

impl Destination {
    /// Parses a destination argument; `-` means standard output.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnpack_core::Destination;
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(Destination::parse("-"), Destination::Stdout);
    /// assert_eq!(
    ///     Destination::parse("function.zip"),
    ///     Destination::File(PathBuf::from("function.zip"))
    /// );
    /// ```
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    fn label(&self) -> PathBuf {
        match self {
            Self::Stdout => PathBuf::from("-"),
            Self::File(path) => path.clone(),
        }
    }

    /// Copies `reader` to this destination byte for byte. Returns the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Destination`] if the file cannot be created or
    /// any read or write fails. A failed write leaves an existing file
    /// untouched.
    pub fn write_from<R: Read + ?Sized>(&self, reader: &mut R) -> Result<u64> {
        match self {
            Self::Stdout => {
                tracing::info!("writing zip archive to stdout");
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                copy_to(reader, &mut lock, self)
            }
            Self::File(path) => {
                tracing::info!("writing zip archive to {}", path.display());
                let to_error = |source| PackError::Destination {
                    path: path.clone(),
                    source,
                };
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let mut staged = NamedTempFile::new_in(parent).map_err(to_error)?;
                let written = copy_to(reader, &mut BufWriter::new(staged.as_file_mut()), self)?;
                staged.persist(path).map_err(|e| to_error(e.error))?;
                Ok(written)
            }
        }
    }
}

/// Writes `artifact` to `destination`. See [`Destination::write_from`].
///
/// # Errors
///
/// Returns [`PackError::Destination`] naming the destination on failure.
pub fn write_to<R: Read + ?Sized>(artifact: &mut R, destination: &Destination) -> Result<u64> {
    destination.write_from(artifact)
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("-"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn copy_to<R: Read + ?Sized, W: Write>(
    reader: &mut R,
    writer: &mut W,
    destination: &Destination,
) -> Result<u64> {
    let to_error = |source| PackError::Destination {
        path: destination.label(),
        source,
    };
    let written = std::io::copy(reader, writer).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_display_round_trips_argument() {
        assert_eq!(Destination::parse("-").to_string(), "-");
        assert_eq!(Destination::parse("out/fn.zip").to_string(), "out/fn.zip");
    }

    #[test]
    fn test_write_to_file_copies_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("function.zip");
        let data = b"PK\x05\x06 pretend archive".to_vec();

        let written = Destination::File(path.clone())
            .write_from(&mut Cursor::new(data.clone()))
            .unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(fs::read(&path).unwrap(), data);
    }

    #[test]
    fn test_write_truncates_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("function.zip");
        fs::write(&path, "a much longer previous artifact").unwrap();

        Destination::File(path.clone())
            .write_from(&mut Cursor::new(b"new".to_vec()))
            .unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_failed_write_keeps_existing_file() {
        struct FailingReader;

        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("artifact vanished"))
            }
        }

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("function.zip");
        fs::write(&path, "previous artifact").unwrap();

        let err = Destination::File(path.clone())
            .write_from(&mut FailingReader)
            .unwrap_err();

        assert!(matches!(err, PackError::Destination { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"previous artifact");
        // The staging file is cleaned up.
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_to_missing_directory_fails_with_path() {
        let dest = Destination::File(PathBuf::from("/nonexistent/dir/function.zip"));
        let err = dest.write_from(&mut Cursor::new(b"x".to_vec())).unwrap_err();
        assert!(matches!(err, PackError::Destination { .. }));
        assert!(err.to_string().contains("/nonexistent/dir/function.zip"));
    }
}
