//! High-level public API for producing deployable artifacts.

use crate::ArchiveBuilder;
use crate::Artifact;
use crate::PackConfig;
use crate::Result;
use crate::loader::LoadedArchive;
use crate::loader::load_archive;
use std::io::Read;
use std::path::Path;

/// Extensions treated as pre-built archives by [`prepare_artifact`].
pub const PREBUILT_EXTENSIONS: &[&str] = &["zip", "jar"];

/// Builds a zip artifact from a directory or single file.
///
/// Equivalent to `ArchiveBuilder::new(config.clone()).build(source)`.
///
/// # Errors
///
/// Returns an error if the source does not exist, traversal or reading
/// fails, or the archive cannot be written.
///
/// # Examples
///
/// ```no_run
/// use fnpack_core::PackConfig;
/// use fnpack_core::create_archive;
///
/// let config = PackConfig::default().with_exclude_file("./function/.lambdaignore")?;
/// let artifact = create_archive("./function", &config)?;
/// println!("{} bytes, {} files", artifact.size(), artifact.report().files_added);
/// # Ok::<(), fnpack_core::PackError>(())
/// ```
pub fn create_archive(source: impl AsRef<Path>, config: &PackConfig) -> Result<Artifact> {
    ArchiveBuilder::new(config.clone()).build(source)
}

/// An artifact ready for upload or persisting.
#[derive(Debug)]
pub enum PreparedArtifact {
    /// Freshly built from a source tree.
    Built(Artifact),

    /// An existing archive passed through unchanged.
    Loaded(LoadedArchive),
}

impl PreparedArtifact {
    /// Size of the artifact in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::Built(artifact) => artifact.size(),
            Self::Loaded(loaded) => loaded.size,
        }
    }

    /// Returns `true` if the artifact was built by this call.
    #[must_use]
    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }
}

impl Read for PreparedArtifact {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Built(artifact) => artifact.read(buf),
            Self::Loaded(loaded) => loaded.read(buf),
        }
    }
}

/// Returns `true` if `source` names an existing file with a pre-built
/// archive extension (case-insensitive).
#[must_use]
pub fn is_prebuilt_archive(source: &Path) -> bool {
    source.is_file()
        && source
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                PREBUILT_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}

/// Loads `source` if it is a pre-built archive, otherwise builds one.
///
/// # Errors
///
/// Returns [`PackError::InvalidArchive`](crate::PackError::InvalidArchive)
/// for a malformed pre-built archive, or any error of [`create_archive`].
pub fn prepare_artifact(source: impl AsRef<Path>, config: &PackConfig) -> Result<PreparedArtifact> {
    let source = source.as_ref();
    if is_prebuilt_archive(source) {
        tracing::debug!("{} is a pre-built archive", source.display());
        return load_archive(source).map(PreparedArtifact::Loaded);
    }
    create_archive(source, config).map(PreparedArtifact::Built)
}
