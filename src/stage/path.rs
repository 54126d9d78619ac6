//! Absolute prim paths.
//!
//! Paths address prims in the stage's hierarchical namespace, e.g.
//! `/world/geo/chair`. Only absolute paths are representable; parsing a
//! relative or empty path fails. Paths are cheap to clone (shared string
//! storage) and hash by content, so they work as map keys across stages.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{BridgeError, Result};

/// An absolute, normalized path to a prim.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PrimPath {
    full: Arc<str>,
}

impl PrimPath {
    /// The pseudo-root path `/`.
    #[must_use]
    pub fn root() -> Self {
        PrimPath { full: Arc::from("/") }
    }

    /// Parses an absolute path. Trailing slashes are stripped.
    pub fn new(text: &str) -> Result<Self> {
        let trimmed = if text.len() > 1 {
            text.trim_end_matches('/')
        } else {
            text
        };
        if trimmed == "/" {
            return Ok(Self::root());
        }
        if !trimmed.starts_with('/') || trimmed[1..].split('/').any(str::is_empty) {
            return Err(BridgeError::InvalidPath(text.to_string()));
        }
        Ok(PrimPath { full: Arc::from(trimmed) })
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        &*self.full == "/"
    }

    /// The last path component, or `""` for the pseudo-root.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.full.rsplit('/').next().unwrap_or("")
    }

    /// The parent path, or `None` for the pseudo-root.
    #[must_use]
    pub fn parent(&self) -> Option<PrimPath> {
        if self.is_root() {
            return None;
        }
        match self.full.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(PrimPath { full: Arc::from(&self.full[..idx]) }),
            None => None,
        }
    }

    /// Appends a child component.
    ///
    /// `name` must be a single component (non-empty, no `/`); violating
    /// that is a caller bug.
    #[must_use]
    pub fn child(&self, name: &str) -> PrimPath {
        debug_assert!(!name.is_empty() && !name.contains('/'));
        let full = if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.full)
        };
        PrimPath { full: Arc::from(full.as_str()) }
    }

    /// Iterates path components from the root downwards.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.full.split('/').filter(|c| !c.is_empty())
    }

    /// Number of components (0 for the pseudo-root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }
}

impl FromStr for PrimPath {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        PrimPath::new(s)
    }
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_relative_and_empty() {
        assert!(PrimPath::new("").is_err());
        assert!(PrimPath::new("a/b").is_err());
        assert!(PrimPath::new("/a//b").is_err());
    }

    #[test]
    fn parent_chain_ends_at_root() {
        let p = PrimPath::new("/a/b/c").unwrap();
        let b = p.parent().unwrap();
        assert_eq!(b.as_str(), "/a/b");
        let a = b.parent().unwrap();
        assert_eq!(a.as_str(), "/a");
        let root = a.parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn child_and_name() {
        let p = PrimPath::root().child("world").child("geo");
        assert_eq!(p.as_str(), "/world/geo");
        assert_eq!(p.name(), "geo");
        assert_eq!(p.depth(), 2);
    }

    #[test]
    fn trailing_slash_is_normalized() {
        assert_eq!(PrimPath::new("/a/b/").unwrap().as_str(), "/a/b");
    }
}
