//! Error types for the overlay filesystem.

use std::fmt;
use std::path::PathBuf;

use crate::VirtualPath;

/// Result alias used throughout the crate.
pub type Result<T, E = VfsError> = std::result::Result<T, E>;

/// Stable error codes surfaced to callers.
///
/// Every [`VfsError`] maps onto exactly one code through [`VfsError::code`].
/// The set is closed: new error variants must reuse one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// The requested object does not exist.
    Nonexistent,
    /// A path component (or the target) is not a directory.
    NotADirectory,
    /// The target is a directory where a file was required.
    IsADirectory,
    /// The archive is already mounted at that mount point.
    DuplicateMount,
    /// Nothing is mounted at the given path.
    NotMounted,
    /// The archive supplies the mount point of another mounted archive.
    Busy,
    /// The archive exists but could not be read.
    ArchiveDamaged,
    /// No registered handler can load the archive.
    ArchiveTypeUnsupported,
    /// The archive's real path does not exist.
    ArchiveNonexistent,
    /// No archive root directory is configured.
    ArchiveNoDirectory,
    /// Host I/O failure.
    IoError,
    /// A backend entry is neither a file nor a directory.
    UnhandledType,
    /// An argument violated an input contract.
    ConstraintError,
}

impl Code {
    /// Upper-snake name of the code, e.g. `NOT_A_DIRECTORY`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Code::Nonexistent => "NONEXISTENT",
            Code::NotADirectory => "NOT_A_DIRECTORY",
            Code::IsADirectory => "IS_A_DIRECTORY",
            Code::DuplicateMount => "DUPLICATE_MOUNT",
            Code::NotMounted => "NOT_MOUNTED",
            Code::Busy => "BUSY",
            Code::ArchiveDamaged => "ARCHIVE_DAMAGED",
            Code::ArchiveTypeUnsupported => "ARCHIVE_TYPE_UNSUPPORTED",
            Code::ArchiveNonexistent => "ARCHIVE_NONEXISTENT",
            Code::ArchiveNoDirectory => "ARCHIVE_NO_DIRECTORY",
            Code::IoError => "IO_ERROR",
            Code::UnhandledType => "UNHANDLED_TYPE",
            Code::ConstraintError => "CONSTRAINT_ERROR",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem error type with contextual variants.
///
/// Resolution errors carry the virtual path that failed, mount errors carry
/// the mount point and (where known) the archive's real path.
///
/// # Examples
///
/// ```rust
/// use vfs_overlay::{Code, VfsError, VirtualPath};
///
/// let err = VfsError::NotFound { path: VirtualPath::parse("/missing").unwrap() };
/// assert_eq!(err.to_string(), "not found: /missing");
/// assert_eq!(err.code(), Code::Nonexistent);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    // Resolution errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: VirtualPath,
    },

    /// Expected a directory but found a file.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: VirtualPath,
    },

    /// Expected a file but found a directory.
    #[error("is a directory: {path}")]
    IsADirectory {
        /// The path that is a directory.
        path: VirtualPath,
    },

    // Mount lifecycle errors
    /// The same real path is already in the stack at this mount point.
    #[error("{} already mounted at {mount_path}", real_path.display())]
    DuplicateMount {
        /// The mount point.
        mount_path: VirtualPath,
        /// Real path of the archive.
        real_path: PathBuf,
    },

    /// No archive is mounted at the path.
    #[error("not mounted: {path}")]
    NotMounted {
        /// The path that has no mount stack.
        path: VirtualPath,
    },

    /// The top archive at the mount point provides another archive's mount point.
    #[error("mount point busy: {path}")]
    Busy {
        /// The mount point.
        path: VirtualPath,
    },

    // Archive errors
    /// The archive could not be read.
    #[error("archive damaged: {} ({details})", real_path.display())]
    ArchiveDamaged {
        /// Real path of the archive.
        real_path: PathBuf,
        /// What went wrong.
        details: String,
    },

    /// No handler accepts the archive.
    #[error("unsupported archive type: {}", real_path.display())]
    ArchiveTypeUnsupported {
        /// Real path of the archive.
        real_path: PathBuf,
    },

    /// The archive does not exist on the host.
    #[error("archive does not exist: {}", real_path.display())]
    ArchiveNonexistent {
        /// Real path of the archive.
        real_path: PathBuf,
    },

    /// Mounting by name requires an archive root.
    #[error("no archive directory configured to mount {name}")]
    ArchiveNoDirectory {
        /// The archive name that was requested.
        name: String,
    },

    /// A backend entry is neither a file nor a directory.
    #[error("unhandled entry type: {}", path.display())]
    UnhandledType {
        /// Host path of the entry.
        path: PathBuf,
    },

    /// I/O error with context.
    #[error("{operation} failed for {}: {source}", path.display())]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The host path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // Input contract errors
    /// A path component failed name validation.
    #[error("invalid name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A path string could not be parsed.
    #[error("malformed path {input:?}: {reason}")]
    MalformedPath {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl VfsError {
    /// The stable [`Code`] for this error.
    pub fn code(&self) -> Code {
        match self {
            VfsError::NotFound { .. } => Code::Nonexistent,
            VfsError::NotADirectory { .. } => Code::NotADirectory,
            VfsError::IsADirectory { .. } => Code::IsADirectory,
            VfsError::DuplicateMount { .. } => Code::DuplicateMount,
            VfsError::NotMounted { .. } => Code::NotMounted,
            VfsError::Busy { .. } => Code::Busy,
            VfsError::ArchiveDamaged { .. } => Code::ArchiveDamaged,
            VfsError::ArchiveTypeUnsupported { .. } => Code::ArchiveTypeUnsupported,
            VfsError::ArchiveNonexistent { .. } => Code::ArchiveNonexistent,
            VfsError::ArchiveNoDirectory { .. } => Code::ArchiveNoDirectory,
            VfsError::UnhandledType { .. } => Code::UnhandledType,
            VfsError::Io { .. } => Code::IoError,
            VfsError::InvalidName { .. }
            | VfsError::MalformedPath { .. }
            | VfsError::Deserialization(_) => Code::ConstraintError,
        }
    }

    /// Returns `true` for [`VfsError::NotFound`].
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound { .. })
    }

    /// Wrap a host I/O error with the operation and host path.
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VfsError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for VfsError {
    fn from(error: std::io::Error) -> Self {
        // Host errors carry no virtual path; backends translate NotFound themselves.
        VfsError::io("io", PathBuf::new(), error)
    }
}
