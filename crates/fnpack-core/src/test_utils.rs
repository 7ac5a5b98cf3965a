//! Test utilities for building and inspecting artifacts without touching a
//! real source tree.
//!
//! # Panics
//!
//! The helpers here panic on malformed archives since they are meant for
//! test code only.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::PackError;
use crate::Result;
use crate::walker::EntryKind;
use crate::walker::SourceEntry;
use crate::walker::SourceTree;
use std::collections::BTreeMap;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Debug, Clone)]
enum Node {
    Entry { entry: SourceEntry, data: Option<Vec<u8>> },
    WalkError(String),
}

/// In-memory virtual file list implementing [`SourceTree`].
///
/// Entries are yielded in insertion order. Files can be marked unreadable
/// and walk errors can be injected at any position.
///
/// # Examples
///
/// ```
/// use fnpack_core::ArchiveBuilder;
/// use fnpack_core::PackConfig;
/// use fnpack_core::report::NoopObserver;
/// use fnpack_core::test_utils::{MemoryTree, entry_names};
///
/// let tree = MemoryTree::new()
///     .with_file("a.txt", b"a")
///     .with_file("sub/c.log", b"c");
/// let config = PackConfig::default().with_exclude_patterns(vec!["*.log".into()]);
/// let mut artifact = ArchiveBuilder::new(config)
///     .build_tree(&tree, &mut NoopObserver)
///     .unwrap();
/// assert_eq!(entry_names(&mut artifact), vec!["a.txt"]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTree {
    root: PathBuf,
    nodes: Vec<Node>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// Creates an empty tree rooted at the virtual path `/memory`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/memory"),
            nodes: Vec::new(),
        }
    }

    /// Adds a regular file with mode `0o644`.
    #[must_use]
    pub fn with_file(self, relative_path: &str, data: &[u8]) -> Self {
        self.with_file_mode(relative_path, data, 0o644)
    }

    /// Adds a regular file with an explicit mode.
    #[must_use]
    pub fn with_file_mode(mut self, relative_path: &str, data: &[u8], mode: u32) -> Self {
        let entry = self.entry(relative_path, EntryKind::File, mode, data.len() as u64);
        self.nodes.push(Node::Entry {
            entry,
            data: Some(data.to_vec()),
        });
        self
    }

    /// Adds a directory entry.
    #[must_use]
    pub fn with_dir(mut self, relative_path: &str) -> Self {
        let entry = self.entry(relative_path, EntryKind::Directory, 0o755, 0);
        self.nodes.push(Node::Entry { entry, data: None });
        self
    }

    /// Adds a symlink entry.
    #[must_use]
    pub fn with_symlink(mut self, relative_path: &str, target: &str) -> Self {
        let kind = EntryKind::Symlink {
            target: PathBuf::from(target),
        };
        let entry = self.entry(relative_path, kind, 0o777, 0);
        self.nodes.push(Node::Entry { entry, data: None });
        self
    }

    /// Adds a file whose `open` fails with permission denied.
    #[must_use]
    pub fn with_unreadable_file(mut self, relative_path: &str) -> Self {
        let entry = self.entry(relative_path, EntryKind::File, 0o000, 0);
        self.nodes.push(Node::Entry { entry, data: None });
        self
    }

    /// Injects a traversal error at the current position.
    #[must_use]
    pub fn with_walk_error(mut self, relative_path: &str) -> Self {
        self.nodes.push(Node::WalkError(relative_path.to_string()));
        self
    }

    fn entry(&self, relative_path: &str, kind: EntryKind, mode: u32, size: u64) -> SourceEntry {
        SourceEntry {
            path: self.root.join(relative_path),
            relative_path: relative_path.to_string(),
            kind,
            mode,
            modified: Some(SystemTime::now()),
            size,
        }
    }
}

impl SourceTree for MemoryTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn entries(&self) -> Box<dyn Iterator<Item = Result<SourceEntry>> + '_> {
        Box::new(self.nodes.iter().map(|node| match node {
            Node::Entry { entry, .. } => Ok(entry.clone()),
            Node::WalkError(path) => Err(PackError::Walk {
                path: self.root.join(path),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                ),
            }),
        }))
    }

    fn open(&self, entry: &SourceEntry) -> Result<Box<dyn Read + '_>> {
        let data = self.nodes.iter().find_map(|node| match node {
            Node::Entry { entry: e, data } if e.relative_path == entry.relative_path => {
                data.as_deref()
            }
            _ => None,
        });
        match data {
            Some(data) => Ok(Box::new(data)),
            None => Err(PackError::Read {
                path: entry.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                ),
            }),
        }
    }
}

/// Returns the sorted entry names of a zip archive and rewinds the reader.
#[must_use]
pub fn entry_names<R: Read + Seek>(reader: &mut R) -> Vec<String> {
    let mut names: Vec<String> = read_entries(reader).into_keys().collect();
    names.sort();
    names
}

/// Decompresses every entry of a zip archive into a map of name to bytes,
/// then rewinds the reader.
#[must_use]
pub fn read_entries<R: Read + Seek>(reader: &mut R) -> BTreeMap<String, Vec<u8>> {
    let mut entries = BTreeMap::new();
    {
        let mut archive = zip::ZipArchive::new(&mut *reader).unwrap();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            entries.insert(file.name().to_string(), data);
        }
    }
    reader.seek(SeekFrom::Start(0)).unwrap();
    entries
}
