//! Root-first enumeration of a path's ancestors.

use std::iter::FusedIterator;

use crate::VirtualPath;

/// Lazy sequence `[/, /c1, /c1/c2, ..., path]` for a path with `n` components.
///
/// Yields `n + 1` paths, root first. Iterate again by cloning before use or by
/// calling [`VirtualPath::ancestors`] a second time. Reversing yields the most
/// specific path first.
///
/// ```rust
/// use vfs_overlay::VirtualPath;
///
/// let path = VirtualPath::parse("/a/b").unwrap();
/// let all: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
/// assert_eq!(all, ["/", "/a", "/a/b"]);
/// ```
#[derive(Debug, Clone)]
pub struct Ancestors {
    path: VirtualPath,
    front: usize,
    // one past the last prefix length still to yield
    back: usize,
}

impl Ancestors {
    /// Enumerate the ancestors of `path`, `path` included.
    pub fn new(path: VirtualPath) -> Self {
        let back = path.depth() + 1;
        Self {
            path,
            front: 0,
            back,
        }
    }

    /// Enumerate only the strict ancestors, leaving `path` itself out.
    pub fn strict(path: VirtualPath) -> Self {
        let mut ancestors = Self::new(path);
        ancestors.back -= 1;
        ancestors
    }
}

impl Iterator for Ancestors {
    type Item = VirtualPath;

    fn next(&mut self) -> Option<VirtualPath> {
        if self.front >= self.back {
            return None;
        }
        let item = self.path.prefix(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Ancestors {
    fn next_back(&mut self) -> Option<VirtualPath> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.path.prefix(self.back))
    }
}

impl ExactSizeIterator for Ancestors {}

impl FusedIterator for Ancestors {}
