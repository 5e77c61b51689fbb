//! The contract every mountable backend implements.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use crate::{FileType, VfsError, VirtualPath};

/// A loaded archive: a real directory, a container file, or anything else
/// that can answer lookups for paths relative to its own root.
///
/// All paths passed in are *local*: the mount point has already been
/// stripped, so `/` is the archive's root directory.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a [`Filesystem`](crate::Filesystem)
/// can be shared behind a lock.
///
/// # Object Safety
///
/// This trait is object-safe; the filesystem stores archives as
/// `Box<dyn Archive>`.
pub trait Archive: Send + Sync {
    /// Host location of the archive. Two archives with the same real path are
    /// the same archive for duplicate-mount detection.
    fn real_path(&self) -> &Path;

    /// Resolve a local path.
    ///
    /// The archive root always resolves to [`FileType::Directory`].
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist in this archive,
    ///   including when a component above it is a file. The overlay treats
    ///   this as "ask the next layer"; any other error aborts resolution.
    fn lookup(&self, path: &VirtualPath) -> Result<FileType, VfsError>;

    /// Names of the entries directly inside a local directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::NotADirectory`] if the path is a file
    fn list(&self, path: &VirtualPath) -> Result<BTreeSet<String>, VfsError>;

    /// Size of a file in bytes.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::IsADirectory`] if the path is a directory
    fn file_size(&self, path: &VirtualPath) -> Result<u64, VfsError>;

    /// Last modification time of a file or directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime, VfsError>;

    /// Open a file for reading.
    ///
    /// The stream is independent of the archive; closing the archive while a
    /// stream is open is the caller's problem.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if the path does not exist
    /// - [`VfsError::IsADirectory`] if the path is a directory
    /// - [`VfsError::Io`] if the backend fails to open the file
    fn open(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>, VfsError>;

    /// Release backend resources. Called once, when the archive is unmounted.
    fn close(&mut self) -> Result<(), VfsError> {
        Ok(())
    }
}
