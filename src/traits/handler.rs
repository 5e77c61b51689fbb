//! Archive type detection and loading.

use std::fmt;
use std::path::Path;

use crate::{Archive, DirHandler, VfsError};

/// Recognises and loads one kind of archive.
///
/// Handlers are consulted in registration order; the first whose
/// [`can_handle`](Self::can_handle) returns `true` loads the archive.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use vfs_overlay::{Archive, ArchiveHandler, MemoryArchive, VfsError};
///
/// struct EmptyHandler;
///
/// impl ArchiveHandler for EmptyHandler {
///     fn name(&self) -> &'static str {
///         "empty"
///     }
///
///     fn can_handle(&self, real_path: &Path) -> bool {
///         real_path.extension().is_some_and(|ext| ext == "empty")
///     }
///
///     fn load(&self, real_path: &Path) -> Result<Box<dyn Archive>, VfsError> {
///         Ok(Box::new(MemoryArchive::new(real_path)))
///     }
/// }
/// ```
pub trait ArchiveHandler: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Returns `true` if this handler can load the archive at `real_path`.
    fn can_handle(&self, real_path: &Path) -> bool;

    /// Load the archive at `real_path`.
    ///
    /// # Errors
    ///
    /// - [`VfsError::ArchiveDamaged`] if the archive exists but cannot be read
    /// - [`VfsError::Io`] for host I/O failures
    fn load(&self, real_path: &Path) -> Result<Box<dyn Archive>, VfsError>;
}

/// Ordered list of archive handlers owned by one filesystem.
///
/// [`Handlers::default`] holds the plain-directory handler only.
pub struct Handlers(Vec<Box<dyn ArchiveHandler>>);

impl Handlers {
    /// An empty list; nothing can be mounted by name until a handler is added.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Append a handler. Earlier handlers take precedence.
    pub fn push(&mut self, handler: impl ArchiveHandler + 'static) {
        self.0.push(Box::new(handler));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, handler: impl ArchiveHandler + 'static) -> Self {
        self.push(handler);
        self
    }

    /// The first handler that accepts `real_path`.
    pub fn find(&self, real_path: &Path) -> Option<&dyn ArchiveHandler> {
        self.0
            .iter()
            .find(|h| h.can_handle(real_path))
            .map(|h| &**h)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::empty().with(DirHandler)
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|h| h.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryArchive;

    struct ExtHandler(&'static str);

    impl ArchiveHandler for ExtHandler {
        fn name(&self) -> &'static str {
            self.0
        }

        fn can_handle(&self, real_path: &Path) -> bool {
            real_path.extension().is_some_and(|ext| ext == self.0)
        }

        fn load(&self, real_path: &Path) -> Result<Box<dyn Archive>, VfsError> {
            Ok(Box::new(MemoryArchive::new(real_path)))
        }
    }

    #[test]
    fn first_match_wins() {
        let handlers = Handlers::empty()
            .with(ExtHandler("zip"))
            .with(ExtHandler("7z"))
            .with(ExtHandler("zip"));
        assert_eq!(handlers.len(), 3);
        let found = handlers.find(Path::new("/a/b.7z")).unwrap();
        assert_eq!(found.name(), "7z");
        assert!(handlers.find(Path::new("/a/b.tar")).is_none());
    }

    #[test]
    fn default_contains_directory_handler() {
        let handlers = Handlers::default();
        assert_eq!(format!("{handlers:?}"), "[\"directory\"]");
    }

    #[test]
    fn empty_finds_nothing() {
        let handlers = Handlers::empty();
        assert!(handlers.is_empty());
        assert!(handlers.find(Path::new("/")).is_none());
    }
}
