//! Read operations on a resolved virtual namespace.

use std::collections::BTreeSet;
use std::io::Read;
use std::time::SystemTime;

use crate::{DirEntry, Resolved, VfsError, VirtualPath};

/// Read-side operations of a virtual namespace.
///
/// Implemented by [`Filesystem`](crate::Filesystem). Convenience methods
/// (`exists`, `is_file`, `read_dir`, ...) come from [`VfsExt`](crate::VfsExt),
/// which is blanket-implemented for every `VfsRead`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn VfsRead`.
pub trait VfsRead: Send + Sync {
    /// Resolve a path.
    ///
    /// Every strict ancestor must resolve to a directory first. An absent
    /// final component is `Ok(Resolved::NotFound)`, not an error.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotADirectory`] if an ancestor is a file
    /// - [`VfsError::NotFound`] if an ancestor does not exist
    fn lookup(&self, path: &VirtualPath) -> Result<Resolved, VfsError>;

    /// Names inside a directory, sorted.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotADirectory`] if the path is a file
    fn list_directory(&self, path: &VirtualPath) -> Result<BTreeSet<String>, VfsError>;

    /// Size of a file in bytes.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::IsADirectory`] if the path is a directory
    fn file_size(&self, path: &VirtualPath) -> Result<u64, VfsError>;

    /// Last modification time of a file.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::IsADirectory`] if the path is a directory
    fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime, VfsError>;

    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::IsADirectory`] if the path is a directory
    fn open_file(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>, VfsError>;
}

/// Iterator over directory entries.
///
/// - Outer `Result` (from [`VfsExt::read_dir`](crate::VfsExt::read_dir)) = "can I list this directory?"
/// - Inner `Result` (per item) = "can I resolve this entry?"
pub struct ReadDirIter(Box<dyn Iterator<Item = Result<DirEntry, VfsError>> + Send + 'static>);

impl ReadDirIter {
    /// Create from any compatible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<DirEntry, VfsError>> + Send + 'static,
    {
        Self(Box::new(iter))
    }

    /// Create from a pre-collected vector.
    pub fn from_vec(entries: Vec<Result<DirEntry, VfsError>>) -> Self {
        Self(Box::new(entries.into_iter()))
    }

    /// Collect all entries, short-circuiting on first error.
    pub fn collect_all(self) -> Result<Vec<DirEntry>, VfsError> {
        self.collect()
    }
}

impl Iterator for ReadDirIter {
    type Item = Result<DirEntry, VfsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}
