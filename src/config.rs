//! Filesystem configuration.

use std::path::{Path, PathBuf};

/// Environment variable read by [`Config::from_env`].
pub const ARCHIVE_ROOT_ENV: &str = "VFS_OVERLAY_ARCHIVE_ROOT";

/// Settings for a [`Filesystem`](crate::Filesystem).
///
/// Archive handlers are not part of the configuration; they are passed to
/// [`Filesystem::with_handlers`](crate::Filesystem::with_handlers) directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Host directory that archive names passed to `mount` are resolved against.
    pub archive_root: Option<PathBuf>,
}

impl Config {
    /// Configuration with no archive root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the archive root.
    pub fn with_archive_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.archive_root = Some(root.into());
        self
    }

    /// Configuration taken from the environment.
    ///
    /// The archive root comes from `VFS_OVERLAY_ARCHIVE_ROOT`; an unset or
    /// empty variable leaves it unset.
    pub fn from_env() -> Self {
        let archive_root = std::env::var_os(ARCHIVE_ROOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self { archive_root }
    }

    /// Parse a configuration from JSON.
    ///
    /// ```rust
    /// use vfs_overlay::Config;
    ///
    /// let config = Config::from_json(r#"{ "archive_root": "/srv/archives" }"#).unwrap();
    /// assert_eq!(config.archive_root.unwrap().to_str(), Some("/srv/archives"));
    /// ```
    ///
    /// # Errors
    ///
    /// - [`VfsError::Deserialization`](crate::VfsError::Deserialization) if the JSON is invalid
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::VfsError::Deserialization(e.to_string()))
    }

    /// Host location of the archive called `name`, if an archive root is set.
    pub fn archive_location(&self, name: &str) -> Option<PathBuf> {
        self.archive_root.as_deref().map(|root: &Path| root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_root() {
        let config = Config::new();
        assert_eq!(config.archive_root, None);
        assert_eq!(config.archive_location("a.zip"), None);
    }

    #[test]
    fn archive_location_joins_root() {
        let config = Config::new().with_archive_root("/srv/archives");
        assert_eq!(
            config.archive_location("data"),
            Some(PathBuf::from("/srv/archives/data"))
        );
    }

    #[test]
    fn from_env_reads_archive_root() {
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(ARCHIVE_ROOT_ENV, "/srv/from-env") };
        assert_eq!(
            Config::from_env().archive_root,
            Some(PathBuf::from("/srv/from-env"))
        );

        unsafe { std::env::set_var(ARCHIVE_ROOT_ENV, "") };
        assert_eq!(Config::from_env(), Config::default());

        unsafe { std::env::remove_var(ARCHIVE_ROOT_ENV) };
        assert_eq!(Config::from_env().archive_root, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_json_defaults_missing_fields() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn from_json_rejects_garbage() {
        let err = Config::from_json("not json").unwrap_err();
        assert_eq!(err.code(), crate::Code::ConstraintError);
    }
}
