//! Exclude-pattern matching for archive building.
//!
//! Patterns are matched against the whole relative path as a flat string,
//! not per component: `*` matches any run of characters including `/`, so
//! `*.log` excludes `sub/c.log` and `**/.git/*` behaves exactly like
//! `*/.git/*`. `?` matches exactly one character. Every other character,
//! brackets included, is a literal, so there is no such thing as a malformed
//! pattern.

/// Matches `name` against a wildcard `pattern`.
///
/// # Examples
///
/// ```
/// use fnpack_core::filter::wildcard_match;
///
/// assert!(wildcard_match("*.log", "sub/c.log"));
/// assert!(wildcard_match("file?.txt", "file1.txt"));
/// assert!(!wildcard_match("file?.txt", "file.txt"));
/// assert!(wildcard_match("[abc]", "[abc]"));
/// assert!(!wildcard_match("[abc]", "a"));
/// ```
#[must_use]
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() {
        return name.is_empty();
    }
    if pattern == "*" {
        return true;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let mut p = 0;
    let mut n = 0;
    // Position of the last `*` seen and the name index it is currently
    // anchored at; on mismatch the star absorbs one more character.
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, anchor)) => {
                    p = star + 1;
                    n = anchor + 1;
                    backtrack = Some((star, anchor + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Decides which relative paths are left out of an archive.
///
/// A path is excluded when it matches any pattern. The filter holds no
/// mutable state and can be shared across builds and threads.
///
/// # Examples
///
/// ```
/// use fnpack_core::filter::PathFilter;
///
/// let filter = PathFilter::new(["*.log", "tests/*"]);
/// assert!(filter.is_excluded("sub/c.log"));
/// assert!(filter.is_excluded("tests/unit/test_handler.py"));
/// assert!(!filter.is_excluded("handler.py"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    patterns: Vec<String>,
}

impl PathFilter {
    /// Creates a filter from an ordered list of patterns.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the patterns in the order they were given.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if `relative_path` matches any pattern.
    ///
    /// A leading `./` is ignored.
    #[must_use]
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let path = relative_path.strip_prefix("./").unwrap_or(relative_path);
        self.patterns
            .iter()
            .any(|pattern| wildcard_match(pattern, path))
    }
}
