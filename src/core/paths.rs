//! core::paths
//!
//! Path routing for the configuration document.
//!
//! # Storage Layout
//!
//! Everything lives in one configuration directory (default
//! `/etc/cacophony`):
//! - `config.toml` - the document
//! - `config.toml.lock` - advisory lock file, never holds data
//! - `config.toml.tmp` - transient file used for atomic writes
//!
//! # Directory Resolution
//!
//! Searched in order:
//! 1. An explicit directory (e.g. the CLI's `--config`)
//! 2. `$CACOPHONY_CONFIG_DIR` if set and non-empty
//! 3. [`DEFAULT_CONFIG_DIR`]
//!
//! # Example
//!
//! ```
//! use cacophony_config::core::paths::ConfigPaths;
//! use std::path::PathBuf;
//!
//! let paths = ConfigPaths::new("/etc/cacophony");
//! assert_eq!(paths.document_path(), PathBuf::from("/etc/cacophony/config.toml"));
//! assert_eq!(paths.lock_path(), PathBuf::from("/etc/cacophony/config.toml.lock"));
//! ```

use std::path::{Path, PathBuf};

/// Default configuration directory on a device.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/cacophony";

/// File name of the document inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CACOPHONY_CONFIG_DIR";

/// Paths derived from a configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    dir: PathBuf,
    lock_override: Option<PathBuf>,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_override: None,
        }
    }

    /// Resolve the directory from an explicit choice, the environment or
    /// the default.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(dir) = explicit {
            return Self::new(dir);
        }
        match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => Self::new(dir),
            _ => Self::new(DEFAULT_CONFIG_DIR),
        }
    }

    /// Place the lock file somewhere other than next to the document.
    ///
    /// Used when the document lives on storage that cannot hold OS locks.
    pub fn with_lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_override = Some(path.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// `<document-path>.lock` unless overridden.
    pub fn lock_path(&self) -> PathBuf {
        match &self.lock_override {
            Some(path) => path.clone(),
            None => append_extension(&self.document_path(), "lock"),
        }
    }

    pub fn temp_path(&self) -> PathBuf {
        append_extension(&self.document_path(), "tmp")
    }
}

/// `config.toml` + `lock` -> `config.toml.lock`.
pub(crate) fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
