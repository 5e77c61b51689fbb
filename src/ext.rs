//! # Extension Traits
//!
//! Convenience methods for anything implementing [`VfsRead`].
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`exists`](VfsExt::exists) | Path resolves to anything |
//! | [`is_file`](VfsExt::is_file) | Path resolves to a file |
//! | [`is_directory`](VfsExt::is_directory) | Path resolves to a directory |
//! | [`read`](VfsExt::read) | Whole file as bytes |
//! | [`read_to_string`](VfsExt::read_to_string) | Whole file as UTF-8 |
//! | [`read_dir`](VfsExt::read_dir) | Listing with entry types |
//!
//! With the `serde` feature, `VfsExtJson::read_json` deserializes a file.

use std::io::Read;
use std::path::PathBuf;

use crate::{DirEntry, ReadDirIter, Resolved, VfsError, VfsRead, VirtualPath};

/// Extension methods for any virtual namespace.
///
/// The existence checks turn [`VfsError::NotFound`] into `Ok(false)` and
/// return every other error, so a lookup through a file still reports
/// [`VfsError::NotADirectory`].
///
/// # Example
///
/// ```rust
/// use vfs_overlay::{Filesystem, VfsExt, VirtualPath};
///
/// let fs = Filesystem::default();
/// assert!(fs.is_directory(&VirtualPath::root()).unwrap());
/// assert!(!fs.exists(&VirtualPath::parse("/missing/deeper").unwrap()).unwrap());
/// ```
pub trait VfsExt: VfsRead {
    /// Returns `true` if the path resolves to a file or directory.
    fn exists(&self, path: &VirtualPath) -> Result<bool, VfsError> {
        resolved_matches(self.lookup(path), Resolved::exists)
    }

    /// Returns `true` if the path resolves to a file.
    fn is_file(&self, path: &VirtualPath) -> Result<bool, VfsError> {
        resolved_matches(self.lookup(path), Resolved::is_file)
    }

    /// Returns `true` if the path resolves to a directory.
    fn is_directory(&self, path: &VirtualPath) -> Result<bool, VfsError> {
        resolved_matches(self.lookup(path), Resolved::is_dir)
    }

    /// Read an entire file.
    ///
    /// # Errors
    ///
    /// Errors of [`open_file`](VfsRead::open_file), plus [`VfsError::Io`] if
    /// the stream fails mid-read.
    fn read(&self, path: &VirtualPath) -> Result<Vec<u8>, VfsError> {
        let mut reader = self.open_file(path)?;
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| VfsError::io("read", PathBuf::from(path.as_str()), e))?;
        Ok(data)
    }

    /// Read an entire file as UTF-8.
    ///
    /// # Errors
    ///
    /// As [`read`](Self::read); invalid UTF-8 is reported as [`VfsError::Io`].
    fn read_to_string(&self, path: &VirtualPath) -> Result<String, VfsError> {
        let mut reader = self.open_file(path)?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| VfsError::io("read_to_string", PathBuf::from(path.as_str()), e))?;
        Ok(text)
    }

    /// List a directory with the type of each entry.
    ///
    /// # Errors
    ///
    /// Errors of [`list_directory`](VfsRead::list_directory). Per-entry
    /// resolution failures are yielded as items.
    fn read_dir(&self, path: &VirtualPath) -> Result<ReadDirIter, VfsError> {
        let names = self.list_directory(path)?;
        let entries = names
            .into_iter()
            .map(|name| {
                let child = path.append_name(&name)?;
                match self.lookup(&child)?.file_type() {
                    Some(file_type) => Ok(DirEntry {
                        name,
                        path: child,
                        file_type,
                    }),
                    None => Err(VfsError::NotFound { path: child }),
                }
            })
            .collect();
        Ok(ReadDirIter::from_vec(entries))
    }
}

// Blanket implementation - any VfsRead gets VfsExt for free
impl<T: VfsRead + ?Sized> VfsExt for T {}

fn resolved_matches(
    result: Result<Resolved, VfsError>,
    predicate: fn(&Resolved) -> bool,
) -> Result<bool, VfsError> {
    match result {
        Ok(resolved) => Ok(predicate(&resolved)),
        Err(VfsError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::de::DeserializeOwned;

    /// JSON deserialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait VfsExtJson: VfsRead {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - Errors of [`VfsExt::read`]
        /// - [`VfsError::Deserialization`] if JSON parsing failed
        fn read_json<T: DeserializeOwned>(&self, path: &VirtualPath) -> Result<T, VfsError> {
            let data = self.read(path)?;
            serde_json::from_slice(&data).map_err(|e| VfsError::Deserialization(e.to_string()))
        }
    }

    impl<B: VfsRead + ?Sized> VfsExtJson for B {}
}

#[cfg(feature = "serde")]
pub use json::VfsExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArchiveId, FileType};
    use std::collections::BTreeSet;
    use std::time::SystemTime;

    /// `/dir` is a directory holding `/dir/file.txt`; everything else is missing.
    struct MockVfs;

    impl VfsRead for MockVfs {
        fn lookup(&self, path: &VirtualPath) -> Result<Resolved, VfsError> {
            Ok(match path.as_str() {
                "/" | "/dir" => Resolved::Directory { archive: None },
                "/dir/file.txt" => Resolved::File {
                    archive: ArchiveId(0),
                },
                p if p.starts_with("/dir/file.txt/") => {
                    return Err(VfsError::NotADirectory {
                        path: VirtualPath::parse("/dir/file.txt").unwrap(),
                    });
                }
                p if p.starts_with("/missing/") => {
                    return Err(VfsError::NotFound {
                        path: VirtualPath::parse("/missing").unwrap(),
                    });
                }
                _ => Resolved::NotFound,
            })
        }

        fn list_directory(&self, path: &VirtualPath) -> Result<BTreeSet<String>, VfsError> {
            match path.as_str() {
                "/" => Ok(BTreeSet::from(["dir".to_string()])),
                "/dir" => Ok(BTreeSet::from(["file.txt".to_string()])),
                _ => Err(VfsError::NotFound { path: path.clone() }),
            }
        }

        fn file_size(&self, _: &VirtualPath) -> Result<u64, VfsError> {
            Ok(5)
        }

        fn modification_time(&self, _: &VirtualPath) -> Result<SystemTime, VfsError> {
            Ok(SystemTime::UNIX_EPOCH)
        }

        fn open_file(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>, VfsError> {
            match path.as_str() {
                "/dir/file.txt" => Ok(Box::new(std::io::Cursor::new(b"hello".to_vec()))),
                _ => Err(VfsError::NotFound { path: path.clone() }),
            }
        }
    }

    fn vp(s: &str) -> VirtualPath {
        VirtualPath::parse(s).unwrap()
    }

    #[test]
    fn existence_checks() {
        let fs = MockVfs;
        assert!(fs.exists(&vp("/dir")).unwrap());
        assert!(fs.is_directory(&vp("/dir")).unwrap());
        assert!(!fs.is_file(&vp("/dir")).unwrap());
        assert!(fs.is_file(&vp("/dir/file.txt")).unwrap());
        assert!(!fs.exists(&vp("/nothing")).unwrap());
    }

    #[test]
    fn missing_ancestor_is_false_not_error() {
        let fs = MockVfs;
        assert!(!fs.exists(&vp("/missing/child")).unwrap());
        assert!(!fs.is_directory(&vp("/missing/child")).unwrap());
    }

    #[test]
    fn file_ancestor_is_an_error() {
        let fs = MockVfs;
        let err = fs.exists(&vp("/dir/file.txt/x")).unwrap_err();
        assert!(matches!(err, VfsError::NotADirectory { .. }));
    }

    #[test]
    fn read_whole_file() {
        let fs = MockVfs;
        assert_eq!(fs.read(&vp("/dir/file.txt")).unwrap(), b"hello");
        assert_eq!(fs.read_to_string(&vp("/dir/file.txt")).unwrap(), "hello");
    }

    #[test]
    fn read_dir_resolves_types() {
        let fs = MockVfs;
        let root = fs.read_dir(&VirtualPath::root()).unwrap().collect_all().unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(root[0].file_type, FileType::Directory);
        let dir = fs.read_dir(&vp("/dir")).unwrap().collect_all().unwrap();
        assert_eq!(dir[0].name, "file.txt");
        assert_eq!(dir[0].path, vp("/dir/file.txt"));
        assert_eq!(dir[0].file_type, FileType::File);
    }

    #[test]
    fn ext_available_on_dyn_vfs() {
        let fs: &dyn VfsRead = &MockVfs;
        assert!(fs.is_file(&vp("/dir/file.txt")).unwrap());
    }
}
