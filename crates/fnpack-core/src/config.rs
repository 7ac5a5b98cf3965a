//! Configuration for artifact building.

use crate::PackError;
use crate::Result;
use crate::filter::PathFilter;
use std::path::Path;
use std::path::PathBuf;

/// Name of the exclude file looked up in the working directory by default.
pub const DEFAULT_EXCLUDE_FILE: &str = ".lambdaignore";

/// Patterns excluded from every artifact unless the caller replaces them.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/.git/*",
    "**/.svn/*",
    "**/.terraform/*",
    "**/.lambdaignore",
    "function.json",
    "function.jsonnet",
];

/// How symbolic links found under the source root are archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SymlinkPolicy {
    /// Follow links: file links are archived with their target's content,
    /// directory links are descended into. Link loops fail the build.
    #[default]
    Follow,

    /// Store links as zip symlink entries whose content is the link target.
    Preserve,
}

/// Configuration for building a deployment artifact.
///
/// # Examples
///
/// ```
/// use fnpack_core::PackConfig;
/// use fnpack_core::SymlinkPolicy;
///
/// let config = PackConfig::default()
///     .with_extra_excludes(["*.pyc", "tests/*"])
///     .with_symlinks(SymlinkPolicy::Preserve)
///     .with_compression_level(9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Patterns whose matching relative paths are left out.
    ///
    /// Default: [`DEFAULT_EXCLUDES`].
    pub exclude_patterns: Vec<String>,

    /// Symlink handling.
    ///
    /// Default: [`SymlinkPolicy::Follow`].
    pub symlinks: SymlinkPolicy,

    /// Deflate level, 1 (fastest) to 9 (smallest).
    ///
    /// Default: `6`.
    pub compression_level: u8,

    /// Directory in which the temporary archive is created.
    ///
    /// Default: `None` (system temp directory).
    pub temp_dir: Option<PathBuf>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|p| (*p).to_string()).collect(),
            symlinks: SymlinkPolicy::Follow,
            compression_level: 6,
            temp_dir: None,
        }
    }
}

impl PackConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the exclude patterns, dropping the defaults.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Appends patterns after the current ones.
    #[must_use]
    pub fn with_extra_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Appends the patterns listed in an exclude file.
    ///
    /// A missing file adds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::ExcludeFile`] if the file exists but cannot be
    /// read.
    pub fn with_exclude_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let patterns = load_exclude_file(path)?;
        Ok(self.with_extra_excludes(patterns))
    }

    /// Sets the symlink policy.
    #[must_use]
    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the level is not in 1-9. Use [`validate`](Self::validate)
    /// for non-panicking validation of a config built by field access.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = level;
        self
    }

    /// Sets the temporary directory.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Builds the path filter for these exclude patterns.
    #[must_use]
    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(self.exclude_patterns.iter().cloned())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::InvalidCompressionLevel`] if the compression level
    /// is not in 1-9.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.compression_level) {
            return Err(PackError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }
}

/// Reads exclude patterns from a file, one per line.
///
/// Surrounding whitespace is trimmed. Blank lines and lines starting with
/// `#` are skipped. A missing file yields no patterns.
///
/// # Errors
///
/// Returns [`PackError::ExcludeFile`] for any read error other than the file
/// not existing.
///
/// # Examples
///
/// ```
/// use fnpack_core::config::load_exclude_file;
///
/// let patterns = load_exclude_file("/nonexistent/.lambdaignore").unwrap();
/// assert!(patterns.is_empty());
/// ```
pub fn load_exclude_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PackError::ExcludeFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let patterns: Vec<String> = parse_exclude_lines(&content);
    tracing::debug!(path = %path.display(), count = patterns.len(), "loaded exclude file");
    Ok(patterns)
}

fn parse_exclude_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}
