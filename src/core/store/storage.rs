//! core::store::storage
//!
//! Byte-level persistence of the configuration document.
//!
//! # Design
//!
//! The `DocumentStorage` trait is the store's only view of where the
//! document text lives. It knows nothing about TOML or sections: it reads a
//! whole file and replaces a whole file.
//!
//! Implementations MUST:
//! - Treat a missing document as `Ok(None)`, not an error
//! - Replace the document atomically: readers see either the old or the new
//!   contents, never a mix
//! - Be thread-safe (Send + Sync)
//!
//! [`OsStorage`] writes to `<path>.tmp`, syncs it and renames it over the
//! target. [`MemoryStorage`] keeps documents in a map for tests.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::paths::append_extension;

/// Whole-document read and write.
pub trait DocumentStorage: Debug + Send + Sync {
    /// Read the document, `None` if it does not exist.
    fn read(&self, path: &Path) -> io::Result<Option<String>>;

    /// Atomically replace the document with `contents`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsStorage;

impl DocumentStorage for OsStorage {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Same directory as the target so the rename cannot cross filesystems
        let temp_path = append_extension(path, "tmp");
        let result = (|| {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}

/// In-memory documents keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `path`, if written.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path).cloned())
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory storage lock poisoned")
}

impl DocumentStorage for MemoryStorage {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        Ok(files.get(path).cloned())
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
