//! The overlay filesystem: mount lifecycle and path resolution.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::overlay::{ArchiveRef, PushError};
use crate::{
    Ancestors, Archive, ArchiveId, Config, FileType, Handlers, MountInfo, MountOverlay, Resolved,
    Result, VfsError, VfsRead, VirtualPath, is_valid_name,
};

/// A virtual namespace built from archives stacked at mount points plus
/// directories created with [`create_directory`](Self::create_directory).
///
/// The root directory always exists. Mutating operations take `&mut self`;
/// reads go through [`VfsRead`] and [`VfsExt`](crate::VfsExt).
///
/// Dropping the filesystem closes every archive still mounted.
///
/// # Example
///
/// ```rust
/// use vfs_overlay::{Filesystem, MemoryArchive, VfsExt, VirtualPath};
///
/// let mut fs = Filesystem::default();
/// let archive = MemoryArchive::new("/virtual/base")
///     .with_file("/etc/motd", "hello")
///     .unwrap();
/// fs.mount_archive(Box::new(archive), &VirtualPath::root()).unwrap();
///
/// let motd = VirtualPath::parse("/etc/motd").unwrap();
/// assert_eq!(fs.read_to_string(&motd).unwrap(), "hello");
/// ```
#[derive(Debug)]
pub struct Filesystem {
    config: Config,
    handlers: Handlers,
    overlay: MountOverlay,
    directories: BTreeSet<VirtualPath>,
}

impl Default for Filesystem {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Filesystem {
    /// A filesystem with the default handlers.
    pub fn new(config: Config) -> Self {
        Self::with_handlers(config, Handlers::default())
    }

    /// A filesystem with an explicit handler list.
    pub fn with_handlers(config: Config, handlers: Handlers) -> Self {
        Self {
            config,
            handlers,
            overlay: MountOverlay::new(),
            directories: BTreeSet::from([VirtualPath::root()]),
        }
    }

    /// The configuration this filesystem was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `path` without checking its ancestors.
    ///
    /// Mounted archives shadow explicit directories.
    fn resolve_direct(&self, path: &VirtualPath) -> Result<Resolved> {
        if let Some((file_type, archive)) = self.overlay.lookup(path)? {
            return Ok(match file_type {
                FileType::File => Resolved::File { archive },
                FileType::Directory => Resolved::Directory {
                    archive: Some(archive),
                },
            });
        }
        if self.directories.contains(path) {
            return Ok(Resolved::Directory { archive: None });
        }
        Ok(Resolved::NotFound)
    }

    /// Create `path` and any missing ancestors as explicit directories.
    ///
    /// Existing directories, virtual or archive-backed, are accepted as is.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotADirectory`] at the shallowest component that is a file
    pub fn create_directory(&mut self, path: &VirtualPath) -> Result<()> {
        for ancestor in path.ancestors() {
            match self.resolve_direct(&ancestor)? {
                Resolved::Directory { .. } => {}
                Resolved::File { .. } => return Err(VfsError::NotADirectory { path: ancestor }),
                Resolved::NotFound => {
                    debug!(path = %ancestor, "create directory");
                    self.directories.insert(ancestor);
                }
            }
        }
        Ok(())
    }

    /// Mount the archive called `name` under the configured archive root.
    ///
    /// # Errors
    ///
    /// In the order they are checked:
    ///
    /// - [`VfsError::InvalidName`] if `name` is not a valid name
    /// - [`VfsError::ArchiveNoDirectory`] if no archive root is configured
    /// - [`VfsError::ArchiveNonexistent`] if nothing exists at the location
    /// - [`VfsError::ArchiveTypeUnsupported`] if no handler accepts it
    /// - [`VfsError::DuplicateMount`] if it is already in the stack at `mount_path`
    /// - errors of the handler's `load`
    /// - errors of [`mount_archive`](Self::mount_archive)
    pub fn mount(&mut self, name: &str, mount_path: &VirtualPath) -> Result<ArchiveId> {
        if !is_valid_name(name) {
            return Err(VfsError::InvalidName {
                name: name.to_string(),
            });
        }
        let real_path =
            self.config
                .archive_location(name)
                .ok_or_else(|| VfsError::ArchiveNoDirectory {
                    name: name.to_string(),
                })?;
        if !real_path.exists() {
            return Err(VfsError::ArchiveNonexistent { real_path });
        }
        let Some(handler) = self.handlers.find(&real_path) else {
            return Err(VfsError::ArchiveTypeUnsupported { real_path });
        };
        self.overlay.ensure_not_mounted(mount_path, &real_path)?;
        debug!(handler = handler.name(), real_path = ?real_path, "load archive");
        let archive = handler.load(&real_path)?;
        self.mount_archive(archive, mount_path)
    }

    /// Mount an already loaded archive on top of the stack at `mount_path`.
    ///
    /// If the directory at `mount_path` comes from an archive, that archive
    /// becomes the new one's parent and cannot be unmounted while the new
    /// one stays mounted. A rejected archive is closed before returning.
    ///
    /// # Errors
    ///
    /// - [`VfsError::DuplicateMount`] if an archive with the same real path is
    ///   already in the stack at `mount_path`
    /// - [`VfsError::NotADirectory`] if `mount_path` (or an ancestor) is a file
    /// - [`VfsError::NotFound`] if `mount_path` (or an ancestor) does not exist
    pub fn mount_archive(
        &mut self,
        archive: Box<dyn Archive>,
        mount_path: &VirtualPath,
    ) -> Result<ArchiveId> {
        let parent = match self.mount_parent(archive.real_path(), mount_path) {
            Ok(parent) => parent,
            Err(e) => {
                discard(archive);
                return Err(e);
            }
        };
        let real_path = archive.real_path().to_path_buf();
        match self.overlay.push(mount_path.clone(), archive, parent) {
            Ok(id) => {
                info!(%mount_path, real_path = ?real_path, %id, parent = ?parent, "mounted archive");
                Ok(id)
            }
            Err(PushError { error, archive }) => {
                discard(archive);
                Err(error)
            }
        }
    }

    /// Duplicates are refused before the mount point is resolved.
    fn mount_parent(&self, real_path: &Path, mount_path: &VirtualPath) -> Result<Option<ArchiveId>> {
        self.overlay.ensure_not_mounted(mount_path, real_path)?;
        match self.lookup(mount_path)? {
            Resolved::Directory { archive } => Ok(archive),
            Resolved::File { .. } => Err(VfsError::NotADirectory {
                path: mount_path.clone(),
            }),
            Resolved::NotFound => Err(VfsError::NotFound {
                path: mount_path.clone(),
            }),
        }
    }

    /// Remove and close the top archive at `mount_path`.
    ///
    /// Unmounting a path that has no stack, the root included, is an error
    /// rather than a no-op. If closing fails the archive is still removed.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotMounted`] if nothing is mounted at `mount_path`
    /// - [`VfsError::Busy`] if another archive was mounted into this one
    /// - errors of the archive's `close`
    pub fn unmount(&mut self, mount_path: &VirtualPath) -> Result<ArchiveId> {
        let id = self.overlay.pop(mount_path)?;
        info!(%mount_path, %id, "unmounted archive");
        Ok(id)
    }

    /// Returns `true` if unmounting `mount_path` would fail with [`VfsError::Busy`].
    pub fn is_busy(&self, mount_path: &VirtualPath) -> bool {
        self.overlay.is_busy(mount_path)
    }

    /// Every mounted archive, ordered by mount path then bottom to top.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.overlay.mounts()
    }

    /// A mounted archive by id.
    pub fn archive(&self, id: ArchiveId) -> Option<&ArchiveRef> {
        self.overlay.get(id)
    }

    /// The archive that owns the file at `path`.
    fn file_archive(&self, path: &VirtualPath) -> Result<&ArchiveRef> {
        match self.lookup(path)? {
            Resolved::File { archive } => self
                .overlay
                .get(archive)
                .ok_or_else(|| VfsError::NotFound { path: path.clone() }),
            Resolved::Directory { .. } => Err(VfsError::IsADirectory { path: path.clone() }),
            Resolved::NotFound => Err(VfsError::NotFound { path: path.clone() }),
        }
    }
}

impl VfsRead for Filesystem {
    fn lookup(&self, path: &VirtualPath) -> Result<Resolved> {
        for ancestor in Ancestors::strict(path.clone()) {
            match self.resolve_direct(&ancestor)? {
                Resolved::Directory { .. } => {}
                Resolved::File { .. } => return Err(VfsError::NotADirectory { path: ancestor }),
                Resolved::NotFound => return Err(VfsError::NotFound { path: ancestor }),
            }
        }
        self.resolve_direct(path)
    }

    fn list_directory(&self, path: &VirtualPath) -> Result<BTreeSet<String>> {
        match self.lookup(path)? {
            Resolved::Directory { .. } => {}
            Resolved::File { .. } => return Err(VfsError::NotADirectory { path: path.clone() }),
            Resolved::NotFound => return Err(VfsError::NotFound { path: path.clone() }),
        }

        let mut names = BTreeSet::new();
        for stack in self.overlay.covering_stacks(path) {
            for archive in stack.iter().rev() {
                if archive.has_file_above(path)? {
                    break;
                }
                match archive.lookup(path) {
                    Ok(FileType::Directory) => names.extend(archive.list(path)?),
                    // a file here hides this directory in every lower layer
                    Ok(FileType::File) => break,
                    Err(VfsError::NotFound { .. }) => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        names.extend(
            self.directories
                .iter()
                .filter(|dir| path.is_parent_of(dir))
                .filter_map(|dir| dir.base_name().map(str::to_string)),
        );
        Ok(names)
    }

    fn file_size(&self, path: &VirtualPath) -> Result<u64> {
        self.file_archive(path)?.file_size(path)
    }

    fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime> {
        self.file_archive(path)?.modification_time(path)
    }

    fn open_file(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>> {
        self.file_archive(path)?.open(path)
    }
}

impl Drop for Filesystem {
    fn drop(&mut self) {
        for (archive, error) in self.overlay.drain() {
            warn!(
                mount_path = %archive.mount_path(),
                real_path = ?archive.real_path(),
                %error,
                "failed to close archive"
            );
        }
    }
}

fn discard(mut archive: Box<dyn Archive>) {
    if let Err(error) = archive.close() {
        warn!(real_path = ?archive.real_path(), %error, "failed to close rejected archive");
    }
}
