//! # vfs-overlay
//!
//! An overlay virtual filesystem: archives (host directories, in-memory
//! trees, your own container formats) are stacked at mount points and
//! presented as one read-only namespace of normalized virtual paths.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use vfs_overlay::{Filesystem, MemoryArchive, VfsExt, VfsRead, VirtualPath};
//!
//! let mut fs = Filesystem::default();
//! let root = VirtualPath::root();
//!
//! let base = MemoryArchive::new("/virtual/base")
//!     .with_file("/config/app.toml", "level = 1")
//!     .unwrap();
//! let patch = MemoryArchive::new("/virtual/patch")
//!     .with_file("/config/app.toml", "level = 2")
//!     .unwrap();
//! fs.mount_archive(Box::new(base), &root).unwrap();
//! fs.mount_archive(Box::new(patch), &root).unwrap();
//!
//! // the most recently mounted archive wins
//! let app = VirtualPath::parse("/config/app.toml").unwrap();
//! assert_eq!(fs.read_to_string(&app).unwrap(), "level = 2");
//!
//! // unmounting restores the view underneath
//! fs.unmount(&root).unwrap();
//! assert_eq!(fs.read_to_string(&app).unwrap(), "level = 1");
//! assert_eq!(fs.list_directory(&root).unwrap().len(), 1);
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`VirtualPath`] | Normalized absolute path, `/` separated |
//! | [`Filesystem`] | Mount lifecycle and path resolution |
//! | [`MountOverlay`] | Mount point to archive stack registry |
//! | [`Archive`] | Contract every backend implements |
//! | [`ArchiveHandler`] | Recognises and loads one kind of archive |
//! | [`VfsError`] | Error type, each variant carrying a stable [`Code`] |
//!
//! ---
//!
//! ## Resolution
//!
//! Every strict ancestor of a path is resolved before the path itself, so a
//! request through a file is told apart from a request for something absent:
//!
//! ```rust
//! use vfs_overlay::{Filesystem, MemoryArchive, VfsError, VfsRead, VirtualPath};
//!
//! let mut fs = Filesystem::default();
//! let archive = MemoryArchive::new("/virtual/a").with_file("/file.txt", "x").unwrap();
//! fs.mount_archive(Box::new(archive), &VirtualPath::root()).unwrap();
//!
//! let through_file = VirtualPath::parse("/file.txt/anything").unwrap();
//! let err = fs.lookup(&through_file).unwrap_err();
//! assert_eq!(err.to_string(), "not a directory: /file.txt");
//! ```
//!
//! At each path, archives at the most specific mount point are asked first,
//! top of the stack first. An archive answering "not found" hands over to the
//! next layer; any other answer is final. Explicit directories created with
//! [`Filesystem::create_directory`] come last.
//!
//! ---
//!
//! ## Logging
//!
//! Mount and unmount are logged at `info`, stack changes and directory
//! creation at `debug`, through [`tracing`]. Install any subscriber to see
//! them.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for paths and types, `Config::from_json`, `VfsExtJson::read_json` |

// Private modules
mod ancestors;
mod backends;
mod config;
mod error;
mod ext;
mod filesystem;
mod name;
mod overlay;
mod path;
mod traits;
mod types;

// Public re-exports - paths
pub use ancestors::Ancestors;
pub use name::is_valid_name;
pub use path::{ParseMode, VirtualPath};

// Public re-exports - errors and configuration
pub use config::{ARCHIVE_ROOT_ENV, Config};
pub use error::{Code, Result, VfsError};

// Public re-exports - core types
pub use types::{ArchiveId, DirEntry, FileType, MountInfo, Resolved};

// Public re-exports - contracts
pub use traits::{Archive, ArchiveHandler, Handlers, ReadDirIter, VfsRead};

// Public re-exports - engine
pub use filesystem::Filesystem;
pub use overlay::{ArchiveRef, MountOverlay, PushError};

// Public re-exports - backends
pub use backends::{DirArchive, DirHandler, MemoryArchive};

// Public re-exports - extensions
pub use ext::VfsExt;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::VfsExtJson;
