//! Archive backends shipped with the crate.
//!
//! | Backend | Handler | Source |
//! |---------|---------|--------|
//! | [`DirArchive`] | [`DirHandler`] | a directory on the host |
//! | [`MemoryArchive`] | none, mount with `Filesystem::mount_archive` | built in memory |

mod dir;
mod memory;

pub use dir::{DirArchive, DirHandler};
pub use memory::MemoryArchive;
