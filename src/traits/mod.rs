//! # Contracts
//!
//! The seams between the overlay engine and the outside world.
//!
//! | Trait | Implemented by | Consumed by |
//! |-------|----------------|-------------|
//! | [`Archive`] | backends (`DirArchive`, `MemoryArchive`, your own) | the mount overlay |
//! | [`ArchiveHandler`] | archive type detectors | `Filesystem::mount` |
//! | [`VfsRead`] | `Filesystem` | callers, [`VfsExt`](crate::VfsExt) |
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. The filesystem itself does no locking:
//! mutating operations take `&mut self`, so sharing one instance across
//! threads means wrapping it in a `RwLock` or `Mutex`.

mod archive;
mod handler;
mod vfs_read;

pub use archive::Archive;
pub use handler::{ArchiveHandler, Handlers};
pub use vfs_read::{ReadDirIter, VfsRead};
