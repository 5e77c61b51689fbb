//! In-memory archive.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::{Ancestors, Archive, FileType, Result, VfsError, VirtualPath};

#[derive(Debug, Clone)]
enum Node {
    Dir { modified: SystemTime },
    File { data: Arc<[u8]>, modified: SystemTime },
}

impl Node {
    fn file_type(&self) -> FileType {
        match self {
            Node::Dir { .. } => FileType::Directory,
            Node::File { .. } => FileType::File,
        }
    }

    fn modified(&self) -> SystemTime {
        match self {
            Node::Dir { modified } | Node::File { modified, .. } => *modified,
        }
    }
}

/// An archive whose entries live in memory.
///
/// Built up front with [`with_file`](Self::with_file) and
/// [`with_dir`](Self::with_dir); missing parent directories are created on
/// the way. The real path is only an identity used for duplicate-mount
/// detection and need not exist on the host.
///
/// ```rust
/// use vfs_overlay::{Archive, FileType, MemoryArchive, VirtualPath};
///
/// let archive = MemoryArchive::new("/virtual/a")
///     .with_file("/docs/readme.txt", "hi")
///     .unwrap();
/// let docs = VirtualPath::parse("/docs").unwrap();
/// assert_eq!(archive.lookup(&docs).unwrap(), FileType::Directory);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    real_path: PathBuf,
    entries: BTreeMap<VirtualPath, Node>,
}

impl MemoryArchive {
    /// An archive holding only its root directory.
    pub fn new(real_path: impl Into<PathBuf>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            VirtualPath::root(),
            Node::Dir {
                modified: SystemTime::UNIX_EPOCH,
            },
        );
        Self {
            real_path: real_path.into(),
            entries,
        }
    }

    /// Add a file, replacing any file already at `path`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::MalformedPath`] / [`VfsError::InvalidName`] for a bad `path`
    /// - [`VfsError::NotADirectory`] if an ancestor is a file
    /// - [`VfsError::IsADirectory`] if `path` is a directory
    pub fn with_file(self, path: &str, data: impl Into<Vec<u8>>) -> Result<Self> {
        self.with_file_modified(path, data, SystemTime::UNIX_EPOCH)
    }

    /// Add a file with an explicit modification time.
    ///
    /// # Errors
    ///
    /// As [`with_file`](Self::with_file).
    pub fn with_file_modified(
        mut self,
        path: &str,
        data: impl Into<Vec<u8>>,
        modified: SystemTime,
    ) -> Result<Self> {
        let path = VirtualPath::parse(path)?;
        self.create_parents(&path)?;
        if let Some(Node::Dir { .. }) = self.entries.get(&path) {
            return Err(VfsError::IsADirectory { path });
        }
        let data: Vec<u8> = data.into();
        self.entries.insert(
            path,
            Node::File {
                data: data.into(),
                modified,
            },
        );
        Ok(self)
    }

    /// Add a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// - [`VfsError::MalformedPath`] / [`VfsError::InvalidName`] for a bad `path`
    /// - [`VfsError::NotADirectory`] if `path` or an ancestor is a file
    pub fn with_dir(mut self, path: &str) -> Result<Self> {
        let path = VirtualPath::parse(path)?;
        self.create_parents(&path)?;
        self.insert_dir(path)?;
        Ok(self)
    }

    fn create_parents(&mut self, path: &VirtualPath) -> Result<()> {
        for ancestor in Ancestors::strict(path.clone()) {
            self.insert_dir(ancestor)?;
        }
        Ok(())
    }

    fn insert_dir(&mut self, path: VirtualPath) -> Result<()> {
        match self.entries.get(&path) {
            Some(Node::File { .. }) => Err(VfsError::NotADirectory { path }),
            Some(Node::Dir { .. }) => Ok(()),
            None => {
                self.entries.insert(
                    path,
                    Node::Dir {
                        modified: SystemTime::UNIX_EPOCH,
                    },
                );
                Ok(())
            }
        }
    }

    fn node(&self, path: &VirtualPath) -> Result<&Node> {
        self.entries
            .get(path)
            .ok_or_else(|| VfsError::NotFound { path: path.clone() })
    }
}

impl Archive for MemoryArchive {
    fn real_path(&self) -> &Path {
        &self.real_path
    }

    fn lookup(&self, path: &VirtualPath) -> Result<FileType> {
        Ok(self.node(path)?.file_type())
    }

    fn list(&self, path: &VirtualPath) -> Result<BTreeSet<String>> {
        match self.node(path)? {
            Node::File { .. } => Err(VfsError::NotADirectory { path: path.clone() }),
            Node::Dir { .. } => Ok(self
                .entries
                .keys()
                .filter(|p| path.is_parent_of(p))
                .filter_map(|p| p.base_name().map(str::to_string))
                .collect()),
        }
    }

    fn file_size(&self, path: &VirtualPath) -> Result<u64> {
        match self.node(path)? {
            Node::File { data, .. } => Ok(data.len() as u64),
            Node::Dir { .. } => Err(VfsError::IsADirectory { path: path.clone() }),
        }
    }

    fn modification_time(&self, path: &VirtualPath) -> Result<SystemTime> {
        Ok(self.node(path)?.modified())
    }

    fn open(&self, path: &VirtualPath) -> Result<Box<dyn Read + Send>> {
        match self.node(path)? {
            Node::File { data, .. } => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Node::Dir { .. } => Err(VfsError::IsADirectory { path: path.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn vp(s: &str) -> VirtualPath {
        VirtualPath::parse(s).unwrap()
    }

    fn sample() -> MemoryArchive {
        MemoryArchive::new("/mem/sample")
            .with_file("/a/b/file.txt", "contents")
            .unwrap()
            .with_dir("/empty")
            .unwrap()
    }

    #[test]
    fn parents_are_created() {
        let archive = sample();
        assert_eq!(archive.lookup(&VirtualPath::root()).unwrap(), FileType::Directory);
        assert_eq!(archive.lookup(&vp("/a")).unwrap(), FileType::Directory);
        assert_eq!(archive.lookup(&vp("/a/b")).unwrap(), FileType::Directory);
        assert_eq!(archive.lookup(&vp("/a/b/file.txt")).unwrap(), FileType::File);
    }

    #[test]
    fn lookup_below_a_file_is_not_found() {
        let archive = sample();
        let err = archive.lookup(&vp("/a/b/file.txt/x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn list_immediate_children_only() {
        let archive = sample();
        let names: Vec<String> = archive.list(&VirtualPath::root()).unwrap().into_iter().collect();
        assert_eq!(names, ["a", "empty"]);
        assert!(archive.list(&vp("/empty")).unwrap().is_empty());
        assert!(matches!(
            archive.list(&vp("/a/b/file.txt")),
            Err(VfsError::NotADirectory { .. })
        ));
        assert!(archive.list(&vp("/zzz")).unwrap_err().is_not_found());
    }

    #[test]
    fn file_size_and_open() {
        let archive = sample();
        assert_eq!(archive.file_size(&vp("/a/b/file.txt")).unwrap(), 8);
        let mut text = String::new();
        archive
            .open(&vp("/a/b/file.txt"))
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "contents");
        assert!(matches!(
            archive.file_size(&vp("/a")),
            Err(VfsError::IsADirectory { .. })
        ));
        assert!(matches!(archive.open(&vp("/a")), Err(VfsError::IsADirectory { .. })));
    }

    #[test]
    fn modification_time_is_kept() {
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let archive = MemoryArchive::new("/m")
            .with_file_modified("/f", "x", when)
            .unwrap();
        assert_eq!(archive.modification_time(&vp("/f")).unwrap(), when);
    }

    #[test]
    fn builder_rejects_conflicts() {
        let archive = MemoryArchive::new("/m").with_file("/f", "x").unwrap();
        assert!(matches!(
            archive.clone().with_dir("/f/sub"),
            Err(VfsError::NotADirectory { .. })
        ));
        assert!(matches!(
            archive.clone().with_file("/f/sub", "y"),
            Err(VfsError::NotADirectory { .. })
        ));
        let archive = archive.with_dir("/d").unwrap();
        assert!(matches!(
            archive.with_file("/d", "y"),
            Err(VfsError::IsADirectory { .. })
        ));
    }

    #[test]
    fn builder_rejects_bad_paths() {
        assert!(MemoryArchive::new("/m").with_file("relative", "x").is_err());
        assert!(MemoryArchive::new("/m").with_dir("/a/../b").is_err());
    }
}
