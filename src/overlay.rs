//! Mount stacks: which archives are overlaid where, and in what order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::{Ancestors, Archive, ArchiveId, FileType, MountInfo, Result, VfsError, VirtualPath};

/// A mounted archive together with where it sits in the namespace.
///
/// The `parent` link is provenance only: the id of the archive that supplied
/// the directory this one was mounted into. It never owns anything, and since
/// ids grow with mount order it can only point at an earlier archive.
pub struct ArchiveRef {
    id: ArchiveId,
    mount_path: VirtualPath,
    parent: Option<ArchiveId>,
    archive: Box<dyn Archive>,
}

impl ArchiveRef {
    /// Identifier assigned at mount time.
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    /// Where the archive is mounted.
    pub fn mount_path(&self) -> &VirtualPath {
        &self.mount_path
    }

    /// Host location of the archive.
    pub fn real_path(&self) -> &Path {
        self.archive.real_path()
    }

    /// The archive that supplied the mount point directory, if any.
    pub fn parent(&self) -> Option<ArchiveId> {
        self.parent
    }

    /// Map a virtual path under the mount point to the archive's local path.
    pub fn local_path(&self, path: &VirtualPath) -> VirtualPath {
        path.subtract(&self.mount_path)
    }

    /// Resolve a virtual path inside this archive.
    pub fn lookup(&self, path: &VirtualPath) -> Result<FileType> {
        self.archive.lookup(&self.local_path(path))
    }

    /// Entry names of a virtual directory inside this archive.
    pub fn list(&self, path: &VirtualPath) -> Result<BTreeSet<String>> {
        self.archive.list(&self.local_path(path))
    }

    /// Size of a file inside this archive.
    pub fn file_size(&self, path: &VirtualPath) -> Result<u64> {
        self.archive.file_size(&self.local_path(path))
    }

    /// Modification time of an entry inside this archive.
    pub fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime> {
        self.archive.modification_time(&self.local_path(path))
    }

    /// Open a file inside this archive.
    pub fn open(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>> {
        self.archive.open(&self.local_path(path))
    }

    /// Returns `true` if this archive has a file at a strict ancestor of
    /// `path` below its mount point, which hides `path` and everything the
    /// lower layers of the same stack hold under that file.
    pub fn has_file_above(&self, path: &VirtualPath) -> Result<bool> {
        let local = self.local_path(path);
        // the local root is always a directory
        for ancestor in Ancestors::strict(local).skip(1) {
            match self.archive.lookup(&ancestor) {
                Ok(FileType::File) => return Ok(true),
                Ok(FileType::Directory) => {}
                Err(VfsError::NotFound { .. }) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    fn close(&mut self) -> Result<()> {
        self.archive.close()
    }
}

impl fmt::Debug for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveRef")
            .field("id", &self.id)
            .field("mount_path", &self.mount_path)
            .field("real_path", &self.real_path())
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// An archive refused by [`MountOverlay::push`], handed back unclosed.
pub struct PushError {
    /// Why the archive was refused.
    pub error: VfsError,
    /// The refused archive.
    pub archive: Box<dyn Archive>,
}

impl fmt::Debug for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .field("real_path", &self.archive.real_path())
            .finish()
    }
}

/// Mount point to archive stack registry.
///
/// Each stack is non-empty and ordered by mount time; the last entry is the
/// top and has the highest priority. A stack disappears with its last archive.
#[derive(Debug, Default)]
pub struct MountOverlay {
    stacks: BTreeMap<VirtualPath, Vec<ArchiveRef>>,
    next_id: u64,
}

impl MountOverlay {
    /// An overlay with nothing mounted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is mounted anywhere.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// The stack mounted exactly at `path`.
    pub fn stack(&self, path: &VirtualPath) -> Option<&[ArchiveRef]> {
        self.stacks.get(path).map(Vec::as_slice)
    }

    /// The stacks whose mount point is `path` or one of its ancestors, most
    /// specific mount point first.
    pub fn covering_stacks<'a>(
        &'a self,
        path: &VirtualPath,
    ) -> impl Iterator<Item = &'a [ArchiveRef]> + 'a {
        path.ancestors()
            .rev()
            .filter_map(move |p| self.stacks.get(&p).map(Vec::as_slice))
    }

    /// The most specific stack covering `path`.
    pub fn stack_covering_path(&self, path: &VirtualPath) -> Option<&[ArchiveRef]> {
        self.covering_stacks(path).next()
    }

    /// Resolve `path` through one stack, top archive first.
    ///
    /// Archives that report [`VfsError::NotFound`] are skipped so lower layers
    /// get a say; the first hit wins, and any other error ends the search.
    /// A layer with a file above `path` ends the search with no hit.
    pub fn lookup_through_stack(
        stack: &[ArchiveRef],
        path: &VirtualPath,
    ) -> Result<Option<(FileType, ArchiveId)>> {
        for archive in stack.iter().rev() {
            if archive.has_file_above(path)? {
                break;
            }
            match archive.lookup(path) {
                Ok(file_type) => return Ok(Some((file_type, archive.id))),
                Err(VfsError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Resolve `path` through every covering stack, most specific first.
    pub fn lookup(&self, path: &VirtualPath) -> Result<Option<(FileType, ArchiveId)>> {
        for stack in self.covering_stacks(path) {
            if let Some(hit) = Self::lookup_through_stack(stack, path)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Check that no archive with `real_path` is in the stack at `path` yet.
    ///
    /// # Errors
    ///
    /// - [`VfsError::DuplicateMount`] if one is
    pub fn ensure_not_mounted(&self, path: &VirtualPath, real_path: &Path) -> Result<()> {
        let mounted = self
            .stacks
            .get(path)
            .is_some_and(|stack| stack.iter().any(|a| a.real_path() == real_path));
        if mounted {
            return Err(VfsError::DuplicateMount {
                mount_path: path.clone(),
                real_path: real_path.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Push an archive on top of the stack at `path`.
    ///
    /// # Errors
    ///
    /// A [`PushError`] holding the archive and
    /// - [`VfsError::DuplicateMount`] if an archive with the same real path is
    ///   already in that stack
    pub fn push(
        &mut self,
        path: VirtualPath,
        archive: Box<dyn Archive>,
        parent: Option<ArchiveId>,
    ) -> Result<ArchiveId, PushError> {
        if let Err(error) = self.ensure_not_mounted(&path, archive.real_path()) {
            return Err(PushError { error, archive });
        }
        let id = ArchiveId(self.next_id);
        self.next_id += 1;
        debug!(mount_path = %path, real_path = ?archive.real_path(), %id, "push archive");
        self.stacks.entry(path.clone()).or_default().push(ArchiveRef {
            id,
            mount_path: path,
            parent,
            archive,
        });
        Ok(id)
    }

    /// Returns `true` if another mounted archive names the top of the stack at
    /// `path` as its parent.
    pub fn is_busy(&self, path: &VirtualPath) -> bool {
        let Some(top) = self.stacks.get(path).and_then(|s| s.last()) else {
            return false;
        };
        self.archives().any(|a| a.parent == Some(top.id))
    }

    /// Remove and close the top archive at `path`.
    ///
    /// The archive is removed even if closing it fails; the close error is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotMounted`] if there is no stack at `path`
    /// - [`VfsError::Busy`] if [`is_busy`](Self::is_busy) holds
    /// - whatever the archive's `close` reports
    pub fn pop(&mut self, path: &VirtualPath) -> Result<ArchiveId> {
        if !self.stacks.contains_key(path) {
            return Err(VfsError::NotMounted { path: path.clone() });
        }
        if self.is_busy(path) {
            return Err(VfsError::Busy { path: path.clone() });
        }
        let Some(stack) = self.stacks.get_mut(path) else {
            return Err(VfsError::NotMounted { path: path.clone() });
        };
        let Some(mut archive) = stack.pop() else {
            return Err(VfsError::NotMounted { path: path.clone() });
        };
        if stack.is_empty() {
            self.stacks.remove(path);
        }
        debug!(mount_path = %path, id = %archive.id, "pop archive");
        archive.close()?;
        Ok(archive.id)
    }

    /// Every mounted archive, by mount point then bottom to top.
    pub fn archives(&self) -> impl Iterator<Item = &ArchiveRef> {
        self.stacks.values().flatten()
    }

    /// Find a mounted archive by id.
    pub fn get(&self, id: ArchiveId) -> Option<&ArchiveRef> {
        self.archives().find(|a| a.id == id)
    }

    /// Snapshot of every mount.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.stacks
            .values()
            .flat_map(|stack| stack.iter().enumerate())
            .map(|(layer, a)| MountInfo {
                id: a.id,
                mount_path: a.mount_path.clone(),
                real_path: a.real_path().to_path_buf(),
                parent: a.parent,
                layer,
            })
            .collect()
    }

    /// Pop and close every archive, top of each stack first, deepest mount
    /// points first. Close failures are collected rather than stopping the drain.
    pub(crate) fn drain(&mut self) -> Vec<(ArchiveRef, VfsError)> {
        let mut failures = Vec::new();
        while let Some((_, mut stack)) = self.stacks.pop_last() {
            while let Some(mut archive) = stack.pop() {
                if let Err(e) = archive.close() {
                    failures.push((archive, e));
                }
            }
        }
        failures
    }
}
