//! Host directories as archives.

use std::collections::BTreeSet;
use std::fs::{self, File, Metadata};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::{Archive, ArchiveHandler, FileType, Result, VfsError, VirtualPath, is_valid_name};

/// A real directory on the host, served read-only.
///
/// Host entries whose names are not valid virtual names (or not UTF-8) are
/// left out of listings. Symlinks are followed.
#[derive(Debug, Clone)]
pub struct DirArchive {
    real_path: PathBuf,
}

impl DirArchive {
    /// Open a host directory.
    ///
    /// # Errors
    ///
    /// - [`VfsError::ArchiveNonexistent`] if nothing exists at `real_path`
    /// - [`VfsError::ArchiveTypeUnsupported`] if it is not a directory
    /// - [`VfsError::Io`] for other host failures
    pub fn open(real_path: impl Into<PathBuf>) -> Result<Self> {
        let real_path = real_path.into();
        match fs::metadata(&real_path) {
            Ok(meta) if meta.is_dir() => Ok(Self { real_path }),
            Ok(_) => Err(VfsError::ArchiveTypeUnsupported { real_path }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(VfsError::ArchiveNonexistent { real_path })
            }
            Err(e) => Err(VfsError::io("open archive", real_path, e)),
        }
    }

    fn host_path(&self, path: &VirtualPath) -> PathBuf {
        let mut host = self.real_path.clone();
        host.extend(path.components());
        host
    }

    fn stat(&self, path: &VirtualPath) -> Result<(PathBuf, Metadata)> {
        let host = self.host_path(path);
        match fs::metadata(&host) {
            Ok(meta) => Ok((host, meta)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Err(VfsError::NotFound { path: path.clone() })
            }
            Err(e) => Err(VfsError::io("stat", host, e)),
        }
    }
}

impl Archive for DirArchive {
    fn real_path(&self) -> &Path {
        &self.real_path
    }

    fn lookup(&self, path: &VirtualPath) -> Result<FileType> {
        let (host, meta) = self.stat(path)?;
        if meta.is_dir() {
            Ok(FileType::Directory)
        } else if meta.is_file() {
            Ok(FileType::File)
        } else {
            Err(VfsError::UnhandledType { path: host })
        }
    }

    fn list(&self, path: &VirtualPath) -> Result<BTreeSet<String>> {
        let (host, meta) = self.stat(path)?;
        if !meta.is_dir() {
            return Err(VfsError::NotADirectory { path: path.clone() });
        }
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&host).map_err(|e| VfsError::io("read_dir", &host, e))? {
            let entry = entry.map_err(|e| VfsError::io("read_dir", &host, e))?;
            match entry.file_name().into_string() {
                Ok(name) if is_valid_name(&name) => {
                    names.insert(name);
                }
                Ok(name) => debug!(dir = ?host, %name, "skipping entry with invalid name"),
                Err(raw) => debug!(dir = ?host, name = ?raw, "skipping non UTF-8 entry"),
            }
        }
        Ok(names)
    }

    fn file_size(&self, path: &VirtualPath) -> Result<u64> {
        let (_, meta) = self.stat(path)?;
        if meta.is_dir() {
            return Err(VfsError::IsADirectory { path: path.clone() });
        }
        Ok(meta.len())
    }

    fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime> {
        let (host, meta) = self.stat(path)?;
        meta.modified()
            .map_err(|e| VfsError::io("modification_time", host, e))
    }

    fn open(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>> {
        let (host, meta) = self.stat(path)?;
        if meta.is_dir() {
            return Err(VfsError::IsADirectory { path: path.clone() });
        }
        let file = File::open(&host).map_err(|e| VfsError::io("open", host, e))?;
        Ok(Box::new(file))
    }
}

/// Loads any host directory as a [`DirArchive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirHandler;

impl ArchiveHandler for DirHandler {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn can_handle(&self, real_path: &Path) -> bool {
        real_path.is_dir()
    }

    fn load(&self, real_path: &Path) -> Result<Box<dyn Archive>> {
        Ok(Box::new(DirArchive::open(real_path)?))
    }
}
