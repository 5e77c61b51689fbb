//! Core types for the overlay filesystem.

use std::fmt;
use std::path::PathBuf;

use crate::VirtualPath;

/// Type of a resolved entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// Opaque identifier of a mounted archive.
///
/// Ids are handed out by the filesystem in mount order and never reused within
/// one filesystem instance, so a provenance link to an id can never point at a
/// later archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchiveId(pub u64);

impl fmt::Display for ArchiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of resolving a virtual path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// Nothing exists at the path.
    NotFound,
    /// A directory, provided by an archive or purely virtual (`archive: None`).
    Directory {
        /// The archive that supplied the directory, if any.
        archive: Option<ArchiveId>,
    },
    /// A file, always supplied by an archive.
    File {
        /// The archive that owns the file.
        archive: ArchiveId,
    },
}

impl Resolved {
    /// Returns `true` unless this is [`Resolved::NotFound`].
    #[inline]
    pub fn exists(&self) -> bool {
        !matches!(self, Resolved::NotFound)
    }

    /// Returns `true` for [`Resolved::Directory`].
    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self, Resolved::Directory { .. })
    }

    /// Returns `true` for [`Resolved::File`].
    #[inline]
    pub fn is_file(&self) -> bool {
        matches!(self, Resolved::File { .. })
    }

    /// The entry type, or `None` if nothing was found.
    pub fn file_type(&self) -> Option<FileType> {
        match self {
            Resolved::NotFound => None,
            Resolved::Directory { .. } => Some(FileType::Directory),
            Resolved::File { .. } => Some(FileType::File),
        }
    }

    /// The archive backing the entry, if any.
    pub fn archive(&self) -> Option<ArchiveId> {
        match *self {
            Resolved::NotFound => None,
            Resolved::Directory { archive } => archive,
            Resolved::File { archive } => Some(archive),
        }
    }
}

/// A directory entry returned from `read_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (base name only).
    pub name: String,
    /// Full virtual path of the entry.
    pub path: VirtualPath,
    /// Type of the entry.
    pub file_type: FileType,
}

/// Snapshot of one mounted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MountInfo {
    /// Identifier of the archive.
    pub id: ArchiveId,
    /// Where the archive is mounted.
    pub mount_path: VirtualPath,
    /// Host location of the archive.
    pub real_path: PathBuf,
    /// The archive that supplied the mount point directory, if any.
    pub parent: Option<ArchiveId>,
    /// Position in the mount stack, 0 being the bottom (lowest priority).
    pub layer: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_predicates() {
        let dir = Resolved::Directory { archive: None };
        let file = Resolved::File {
            archive: ArchiveId(3),
        };
        assert!(dir.exists() && dir.is_dir() && !dir.is_file());
        assert!(file.exists() && file.is_file() && !file.is_dir());
        assert!(!Resolved::NotFound.exists());
    }

    #[test]
    fn resolved_file_type_and_archive() {
        assert_eq!(Resolved::NotFound.file_type(), None);
        assert_eq!(
            Resolved::Directory {
                archive: Some(ArchiveId(1))
            }
            .archive(),
            Some(ArchiveId(1))
        );
        assert_eq!(Resolved::Directory { archive: None }.archive(), None);
        assert_eq!(
            Resolved::File {
                archive: ArchiveId(2)
            }
            .file_type(),
            Some(FileType::File)
        );
    }

    #[test]
    fn archive_id_display() {
        assert_eq!(ArchiveId(7).to_string(), "#7");
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Resolved>();
        assert_send_sync::<ArchiveId>();
        assert_send_sync::<DirEntry>();
        assert_send_sync::<MountInfo>();
    }
}
