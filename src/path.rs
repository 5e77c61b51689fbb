//! The virtual path value type and its algebra.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Ancestors, Result, VfsError, is_valid_name};

const SEPARATOR: char = '/';

/// How [`VirtualPath::parse_with`] treats separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// The input must start with `/` and contain no empty components.
    #[default]
    Strict,
    /// Runs of `/` collapse, leading and trailing `/` are ignored and an
    /// all-separator string is the root.
    Lax,
}

/// An immutable, normalized, absolute path in the virtual namespace.
///
/// The canonical form is `/` for the root and `/c1/c2/.../cn` otherwise: no
/// trailing slash, no repeated slashes, and every component passes
/// [`is_valid_name`].
///
/// Equality and hashing follow the canonical string. Ordering puts shallower
/// paths first and compares canonical strings between paths of equal depth,
/// so parents always sort before their children:
///
/// ```rust
/// use vfs_overlay::VirtualPath;
///
/// let mut paths: Vec<VirtualPath> = ["/b/a", "/a/b", "/b", "/", "/a"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// paths.sort();
/// let sorted: Vec<&str> = paths.iter().map(VirtualPath::as_str).collect();
/// assert_eq!(sorted, ["/", "/a", "/b", "/a/b", "/b/a"]);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath {
    repr: String,
}

impl VirtualPath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            repr: String::from("/"),
        }
    }

    /// Parse a path strictly.
    ///
    /// # Errors
    ///
    /// - [`VfsError::MalformedPath`] if `s` is empty, does not start with `/`,
    ///   or contains empty components (`//`, trailing `/`)
    /// - [`VfsError::InvalidName`] if a component fails name validation
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with(s, ParseMode::Strict)
    }

    /// Parse a path, collapsing separators instead of rejecting them.
    ///
    /// ```rust
    /// use vfs_overlay::VirtualPath;
    ///
    /// assert_eq!(VirtualPath::parse_lax("a//b/").unwrap().as_str(), "/a/b");
    /// assert!(VirtualPath::parse_lax("///").unwrap().is_root());
    /// ```
    ///
    /// # Errors
    ///
    /// - [`VfsError::MalformedPath`] if `s` is empty
    /// - [`VfsError::InvalidName`] if a component fails name validation
    pub fn parse_lax(s: &str) -> Result<Self> {
        Self::parse_with(s, ParseMode::Lax)
    }

    /// Parse a path with an explicit [`ParseMode`].
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse) and [`parse_lax`](Self::parse_lax).
    pub fn parse_with(s: &str, mode: ParseMode) -> Result<Self> {
        if s.is_empty() {
            return Err(malformed(s, "empty path"));
        }
        match mode {
            ParseMode::Strict => {
                let Some(rest) = s.strip_prefix(SEPARATOR) else {
                    return Err(malformed(s, "path must start with '/'"));
                };
                if rest.is_empty() {
                    return Ok(Self::root());
                }
                for component in rest.split(SEPARATOR) {
                    if component.is_empty() {
                        return Err(malformed(s, "empty path component"));
                    }
                    check_name(component)?;
                }
                Ok(Self {
                    repr: s.to_string(),
                })
            }
            ParseMode::Lax => {
                let mut path = Self::root();
                for component in s.split(SEPARATOR).filter(|c| !c.is_empty()) {
                    check_name(component)?;
                    path.push_unchecked(component);
                }
                Ok(path)
            }
        }
    }

    /// Canonical string form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    /// Returns `true` for the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.repr.len() == 1
    }

    /// Number of components; zero for the root.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.repr.bytes().filter(|b| *b == b'/').count()
        }
    }

    /// The components, root-most first.
    pub fn components(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.repr[1..].split(SEPARATOR).filter(|c| !c.is_empty())
    }

    /// Last component, or `None` for the root.
    pub fn base_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.repr.rsplit(SEPARATOR).next()
        }
    }

    /// The path without its last component. The parent of the root is the root.
    pub fn parent(&self) -> Self {
        match self.repr.rfind(SEPARATOR) {
            Some(0) | None => Self::root(),
            Some(idx) => Self {
                repr: self.repr[..idx].to_string(),
            },
        }
    }

    /// Append one validated name.
    ///
    /// # Errors
    ///
    /// - [`VfsError::InvalidName`] if `name` fails name validation
    pub fn append_name(&self, name: &str) -> Result<Self> {
        check_name(name)?;
        let mut path = self.clone();
        path.push_unchecked(name);
        Ok(path)
    }

    /// Concatenate `other`'s components onto this path.
    pub fn join(&self, other: &VirtualPath) -> Self {
        if other.is_root() {
            return self.clone();
        }
        if self.is_root() {
            return other.clone();
        }
        Self {
            repr: format!("{}{}", self.repr, other.repr),
        }
    }

    /// Returns `true` if `self` is a proper prefix of `other`, at any depth.
    ///
    /// The root is an ancestor of every other path; no path is its own ancestor.
    pub fn is_ancestor_of(&self, other: &VirtualPath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other.repr.len() > self.repr.len()
            && other.repr.starts_with(&self.repr)
            && other.repr.as_bytes()[self.repr.len()] == b'/'
    }

    /// Returns `true` if `other` is exactly one component below `self`.
    pub fn is_parent_of(&self, other: &VirtualPath) -> bool {
        !other.is_root() && other.parent() == *self
    }

    /// Strip `other` off the front of this path.
    ///
    /// Subtracting the root or an unrelated path returns `self` unchanged;
    /// subtracting `self` yields the root.
    ///
    /// ```rust
    /// use vfs_overlay::VirtualPath;
    ///
    /// let p = VirtualPath::parse("/a/b/c").unwrap();
    /// let a = VirtualPath::parse("/a").unwrap();
    /// assert_eq!(p.subtract(&a).as_str(), "/b/c");
    /// assert!(p.subtract(&p).is_root());
    /// ```
    pub fn subtract(&self, other: &VirtualPath) -> Self {
        if other.is_root() {
            self.clone()
        } else if other == self {
            Self::root()
        } else if other.is_ancestor_of(self) {
            Self {
                repr: self.repr[other.repr.len()..].to_string(),
            }
        } else {
            self.clone()
        }
    }

    /// Every ancestor from the root down to and including this path.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors::new(self.clone())
    }

    /// The path made of the first `len` components.
    pub(crate) fn prefix(&self, len: usize) -> Self {
        if len == 0 {
            return Self::root();
        }
        match self
            .repr
            .match_indices(SEPARATOR)
            .nth(len)
            .map(|(idx, _)| idx)
        {
            Some(end) => Self {
                repr: self.repr[..end].to_string(),
            },
            None => self.clone(),
        }
    }

    fn push_unchecked(&mut self, name: &str) {
        if !self.is_root() {
            self.repr.push(SEPARATOR);
        }
        self.repr.push_str(name);
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(VfsError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn malformed(input: &str, reason: &'static str) -> VfsError {
    VfsError::MalformedPath {
        input: input.to_string(),
        reason,
    }
}

impl Default for VirtualPath {
    fn default() -> Self {
        Self::root()
    }
}

impl Ord for VirtualPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.depth()
            .cmp(&other.depth())
            .then_with(|| self.repr.cmp(&other.repr))
    }
}

impl PartialOrd for VirtualPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl fmt::Debug for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPath({:?})", self.repr)
    }
}

impl FromStr for VirtualPath {
    type Err = VfsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for VirtualPath {
    type Error = VfsError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.repr
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VirtualPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.repr)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VirtualPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vp(s: &str) -> VirtualPath {
        VirtualPath::parse(s).unwrap()
    }

    #[test]
    fn root_is_root() {
        let root = VirtualPath::root();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "/");
        assert_eq!(root.depth(), 0);
        assert_eq!(root.base_name(), None);
        assert_eq!(vp("/"), root);
    }

    #[test]
    fn strict_parse_rejects_bad_separators() {
        for input in ["", "a", "a/b", "//", "/a/", "/a//b", "//a"] {
            let err = VirtualPath::parse(input).unwrap_err();
            assert!(matches!(err, VfsError::MalformedPath { .. }), "{input:?}: {err}");
        }
    }

    #[test]
    fn strict_parse_rejects_bad_names() {
        for input in ["/..", "/a/../b", "/a:b", "/a\\b"] {
            let err = VirtualPath::parse(input).unwrap_err();
            assert!(matches!(err, VfsError::InvalidName { .. }), "{input:?}: {err}");
        }
    }

    #[test]
    fn lax_parse_collapses_separators() {
        assert_eq!(VirtualPath::parse_lax("a/b").unwrap(), vp("/a/b"));
        assert_eq!(VirtualPath::parse_lax("//a///b//").unwrap(), vp("/a/b"));
        assert!(VirtualPath::parse_lax("/").unwrap().is_root());
        assert!(VirtualPath::parse_lax("////").unwrap().is_root());
        assert!(VirtualPath::parse_lax("").is_err());
        assert!(VirtualPath::parse_lax("/a/../b").is_err());
    }

    #[test]
    fn display_round_trips() {
        for s in ["/", "/a", "/a/b.txt", "/x/y/z."] {
            let p = vp(s);
            assert_eq!(VirtualPath::parse(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn components_and_depth() {
        let p = vp("/a/b/c");
        assert_eq!(p.components().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(p.depth(), 3);
        assert_eq!(p.base_name(), Some("c"));
    }

    #[test]
    fn depth_matches_component_count() {
        for s in ["/", "/a", "/a/b", "/x/y/z.", "/long name/with.dots/c"] {
            let p = vp(s);
            assert_eq!(p.depth(), p.components().count(), "{s}");
        }
        let lax = VirtualPath::parse_lax("//a///b//").unwrap();
        assert_eq!(lax.depth(), 2);
    }

    #[test]
    fn parent_drops_last_component() {
        assert_eq!(vp("/a/b").parent(), vp("/a"));
        assert_eq!(vp("/a").parent(), VirtualPath::root());
        assert_eq!(VirtualPath::root().parent(), VirtualPath::root());
    }

    #[test]
    fn append_name_validates() {
        assert_eq!(VirtualPath::root().append_name("a").unwrap(), vp("/a"));
        assert_eq!(vp("/a").append_name("b").unwrap(), vp("/a/b"));
        assert!(vp("/a").append_name("..").is_err());
        assert!(vp("/a").append_name("b/c").is_err());
        assert!(vp("/a").append_name("").is_err());
    }

    #[test]
    fn join_concatenates() {
        assert_eq!(vp("/a").join(&vp("/b/c")), vp("/a/b/c"));
        assert_eq!(VirtualPath::root().join(&vp("/b")), vp("/b"));
        assert_eq!(vp("/a").join(&VirtualPath::root()), vp("/a"));
    }

    #[test]
    fn ancestry() {
        let root = VirtualPath::root();
        assert!(root.is_ancestor_of(&vp("/a")));
        assert!(root.is_ancestor_of(&vp("/a/b/c")));
        assert!(!root.is_ancestor_of(&root));
        assert!(vp("/a").is_ancestor_of(&vp("/a/b/c")));
        assert!(!vp("/a").is_ancestor_of(&vp("/a")));
        assert!(!vp("/a").is_ancestor_of(&vp("/ab")));
        assert!(!vp("/a/b").is_ancestor_of(&vp("/a")));
    }

    #[test]
    fn parent_of_is_immediate_only() {
        assert!(VirtualPath::root().is_parent_of(&vp("/a")));
        assert!(vp("/a").is_parent_of(&vp("/a/b")));
        assert!(!vp("/a").is_parent_of(&vp("/a/b/c")));
        assert!(!vp("/a").is_parent_of(&vp("/a")));
        assert!(!VirtualPath::root().is_parent_of(&VirtualPath::root()));
    }

    #[test]
    fn subtract_rules() {
        let root = VirtualPath::root();
        let p = vp("/a/b");
        assert_eq!(p.subtract(&p), root);
        assert_eq!(root.subtract(&p), root);
        assert_eq!(p.subtract(&root), p);
        assert_eq!(p.subtract(&vp("/a")), vp("/b"));
        // unrelated prefix is a no-op
        assert_eq!(p.subtract(&vp("/x")), p);
        assert_eq!(vp("/ab/c").subtract(&vp("/a")), vp("/ab/c"));
    }

    #[test]
    fn subtract_of_appended_names() {
        for base in ["/", "/x", "/x/y"] {
            let p = vp(base);
            let with_n1 = p.append_name("n1").unwrap();
            let with_both = with_n1.append_name("n2").unwrap();
            assert_eq!(with_both.subtract(&with_n1), vp("/n2"));
        }
    }

    #[test]
    fn ordering_is_depth_then_string() {
        let expected = ["/", "/a", "/b", "/a/a", "/a/b", "/b/a", "/b/b"];
        let mut paths: Vec<VirtualPath> = expected.iter().rev().map(|s| vp(s)).collect();
        paths.sort();
        let sorted: Vec<&str> = paths.iter().map(VirtualPath::as_str).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn hash_follows_canonical_form() {
        let mut set = HashSet::new();
        set.insert(vp("/a/b"));
        assert!(set.contains(&VirtualPath::parse_lax("a//b/").unwrap()));
    }

    #[test]
    fn prefix_takes_leading_components() {
        let p = vp("/a/b/c");
        assert_eq!(p.prefix(0), VirtualPath::root());
        assert_eq!(p.prefix(1), vp("/a"));
        assert_eq!(p.prefix(2), vp("/a/b"));
        assert_eq!(p.prefix(3), p);
    }

    #[test]
    fn debug_shows_canonical_string() {
        assert_eq!(format!("{:?}", vp("/a")), "VirtualPath(\"/a\")");
    }
}
