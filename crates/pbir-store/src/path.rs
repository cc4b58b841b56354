//! Document paths inside a project tree
//!
//! Provides [`DocPath`], a relative `/`-separated path used as the key of the
//! [`DocumentStore`](crate::DocumentStore).

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// Relative path of a document within a project tree
///
/// Always relative and always `/`-separated regardless of platform, so the
/// same key is produced on every OS.
///
/// # Examples
/// - `["Sales.Report", "definition", "pages", "main", "page.json"]`
///   → `Sales.Report/definition/pages/main/page.json`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPath(Vec<String>);

impl DocPath {
    /// Create path from already-validated segments
    ///
    /// # Errors
    /// Returns error if any segment is empty, `.`/`..`, or contains a separator
    pub fn new(segments: Vec<String>) -> Result<Self, PathError> {
        for seg in &segments {
            validate_segment(seg)?;
        }
        Ok(Self(segments))
    }

    /// Empty path (project root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Convert a path relative to `base` into a [`DocPath`]
    ///
    /// # Errors
    /// Returns error if `full` is not under `base` or has non-UTF-8 segments
    pub fn from_fs(base: &Path, full: &Path) -> Result<Self, PathError> {
        let relative = full
            .strip_prefix(base)
            .map_err(|_| PathError::OutsideRoot(full.to_path_buf()))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| PathError::NonUtf8(full.to_path_buf()))?;
                    segments.push(part.to_string());
                }
                Component::CurDir => {}
                _ => return Err(PathError::OutsideRoot(full.to_path_buf())),
            }
        }
        Ok(Self(segments))
    }

    /// Resolve against a filesystem root
    #[must_use]
    pub fn to_fs(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for seg in &self.0 {
            out.push(seg);
        }
        out
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Final segment (the file name)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns error if the segment is not a valid single path component
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// Append several segments
    ///
    /// # Errors
    /// Returns error on the first invalid segment
    pub fn join<I, S>(&self, segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        segments
            .into_iter()
            .try_fold(self.clone(), |acc, seg| acc.child(seg))
    }

    /// Check if `prefix` is a (non-strict) prefix of this path
    #[inline]
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        prefix.0.len() <= self.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Segments after `prefix`, if this path lives under it
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Self) -> Option<&[String]> {
        self.starts_with(prefix).then(|| &self.0[prefix.0.len()..])
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn validate_segment(seg: &str) -> Result<(), PathError> {
    if seg.is_empty() {
        Err(PathError::EmptySegment)
    } else if seg == "." || seg == ".." || seg.contains(['/', '\\']) {
        Err(PathError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        if s.starts_with('/') {
            return Err(PathError::Absolute(s.to_string()));
        }

        let segments: Vec<String> = s
            .split('/')
            .map(|seg| validate_segment(seg).map(|()| seg.to_string()))
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Default for DocPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to document paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// `.`/`..` or a segment containing a separator
    #[error("invalid segment: {0:?}")]
    InvalidSegment(String),

    /// Leading `/`
    #[error("document paths are relative, got {0:?}")]
    Absolute(String),

    /// Filesystem path does not live under the project root
    #[error("{0} is outside the project root")]
    OutsideRoot(PathBuf),

    /// Filesystem path with a non UTF-8 component
    #[error("{0} is not valid UTF-8")]
    NonUtf8(PathBuf),
}
