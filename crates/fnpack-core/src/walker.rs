//! Source enumeration.
//!
//! The builder never walks the filesystem itself. It consumes a
//! [`SourceTree`], an explicit iterator of [`SourceEntry`] values plus a way to
//! open each one, so traversal strategy (recursion, symlink policy) stays
//! independent from compression and can be replaced by an in-memory tree in
//! tests.

use crate::PackError;
use crate::Result;
use crate::config::SymlinkPolicy;
use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use walkdir::WalkDir;

/// Kind of a discovered entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or a followed link to one).
    File,

    /// Directory. Never archived, only descended into.
    Directory,

    /// Symbolic link stored as-is.
    Symlink {
        /// Target of the link.
        target: PathBuf,
    },
}

/// A file, directory, or link discovered under a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path used to open the entry.
    pub path: PathBuf,

    /// Path relative to the source root, `/`-separated, without a leading
    /// `./`. Empty for the root directory itself.
    pub relative_path: String,

    /// Entry kind.
    pub kind: EntryKind,

    /// Unix permission bits (`0o7777` mask).
    pub mode: u32,

    /// Last modification time, when the platform reports one.
    pub modified: Option<SystemTime>,

    /// Size in bytes (0 for directories and links).
    pub size: u64,
}

impl SourceEntry {
    /// Returns `true` for directory entries.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A tree of source entries that can be enumerated and read.
pub trait SourceTree {
    /// Root the entries are relative to, used for diagnostics.
    fn root(&self) -> &Path;

    /// Enumerates every entry exactly once. Order is unspecified.
    fn entries(&self) -> Box<dyn Iterator<Item = Result<SourceEntry>> + '_>;

    /// Opens a file entry for reading.
    fn open(&self, entry: &SourceEntry) -> Result<Box<dyn Read + '_>>;
}

/// Filesystem-backed source tree.
///
/// A directory root is walked recursively, siblings in file name order. A
/// file root yields exactly one entry whose relative path is the file name.
///
/// # Examples
///
/// ```no_run
/// use fnpack_core::SymlinkPolicy;
/// use fnpack_core::walker::{FsTree, SourceTree};
///
/// let tree = FsTree::new("./function", SymlinkPolicy::Follow)?;
/// for entry in tree.entries() {
///     let entry = entry?;
///     println!("{}", entry.relative_path);
/// }
/// # Ok::<(), fnpack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
    symlinks: SymlinkPolicy,
}

impl FsTree {
    /// Creates a tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::SourceNotFound`] if `root` does not exist.
    pub fn new(root: impl Into<PathBuf>, symlinks: SymlinkPolicy) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(PackError::SourceNotFound { path: root });
        }
        Ok(Self { root, symlinks })
    }

    fn source_entry(&self, entry: &walkdir::DirEntry) -> Result<SourceEntry> {
        let path = entry.path().to_path_buf();
        // The root is always resolved, even when it is itself a link.
        let root = entry.depth() == 0;
        let metadata = if root {
            std::fs::metadata(&path).map_err(|source| PackError::Walk {
                path: path.clone(),
                source,
            })?
        } else {
            entry.metadata().map_err(|e| PackError::Walk {
                path: path.clone(),
                source: e.into(),
            })?
        };

        let preserve_link =
            !root && entry.path_is_symlink() && self.symlinks == SymlinkPolicy::Preserve;
        let kind = if preserve_link {
            let target = std::fs::read_link(&path).map_err(|source| PackError::Walk {
                path: path.clone(),
                source,
            })?;
            EntryKind::Symlink { target }
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let relative_path = if root {
            if kind == EntryKind::Directory {
                String::new()
            } else {
                let name = path.file_name().map(Path::new).ok_or_else(|| PackError::Walk {
                    path: path.clone(),
                    source: std::io::Error::other("cannot determine file name"),
                })?;
                relative_name(name, &path)?
            }
        } else {
            let relative = path.strip_prefix(&self.root).map_err(|_| PackError::Walk {
                path: path.clone(),
                source: std::io::Error::other(format!(
                    "path is not under source root {}",
                    self.root.display()
                )),
            })?;
            relative_name(relative, &path)?
        };

        let size = if kind == EntryKind::File {
            metadata.len()
        } else {
            0
        };

        Ok(SourceEntry {
            mode: permission_bits(&metadata),
            modified: metadata.modified().ok(),
            path,
            relative_path,
            kind,
            size,
        })
    }
}

impl SourceTree for FsTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Result<SourceEntry>> + '_> {
        let walker = WalkDir::new(&self.root)
            .follow_links(self.symlinks == SymlinkPolicy::Follow)
            .sort_by_file_name()
            .into_iter();

        Box::new(walker.map(move |entry| match entry {
            Ok(entry) => self.source_entry(&entry),
            Err(e) => {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                Err(PackError::Walk {
                    path,
                    source: e.into(),
                })
            }
        }))
    }

    fn open(&self, entry: &SourceEntry) -> Result<Box<dyn Read + '_>> {
        let file = File::open(&entry.path).map_err(|source| PackError::Read {
            path: entry.path.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// Converts a relative platform path into a `/`-separated archive name.
///
/// `origin` is only used for error reporting.
fn relative_name(relative: &Path, origin: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| PackError::Walk {
                    path: origin.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "path is not valid UTF-8",
                    ),
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(PackError::Walk {
                    path: origin.to_path_buf(),
                    source: std::io::Error::other("unexpected component in relative path"),
                });
            }
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
