//! core::ops::lock
//!
//! Exclusive lock on the configuration document.
//!
//! # Architecture
//!
//! Every process that writes the document takes this lock for the duration
//! of one read-modify-write cycle. The lock is keyed by the document path
//! (`<document>.lock`), not by process: two stores opened on the same
//! directory inside one process open the lock file separately and therefore
//! still exclude each other.
//!
//! # Invariants
//!
//! - Lock is held only for a single read-modify-write (or read) cycle
//! - Lock is automatically released on drop (RAII pattern)
//! - Acquisition blocks for at most the given timeout, polling at
//!   [`LOCK_POLL_INTERVAL`]
//! - The lock file never contains data
//!
//! # Example
//!
//! ```no_run
//! use cacophony_config::core::ops::lock::{DocumentLock, DEFAULT_LOCK_TIMEOUT};
//! use std::path::Path;
//!
//! let lock = DocumentLock::acquire(
//!     Path::new("/etc/cacophony/config.toml.lock"),
//!     DEFAULT_LOCK_TIMEOUT,
//! )?;
//!
//! // Read, modify and write the document while holding the lock
//!
//! // Lock automatically released when dropped
//! drop(lock);
//! # Ok::<(), cacophony_config::core::ops::lock::LockError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

/// Default timeout for lock acquisition (10 seconds).
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Polling interval while waiting for the lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another holder kept the lock past the timeout.
    #[error("timed out after {waited:?} waiting for lock '{path}'")]
    Timeout { path: PathBuf, waited: Duration },

    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on the configuration document.
///
/// The lock is automatically released when this guard is dropped (RAII
/// pattern), including when the operation holding it fails part way.
#[derive(Debug)]
pub struct DocumentLock {
    /// Path to the lock file.
    path: PathBuf,
    /// The open file handle with the lock held.
    /// When this is Some, we hold the lock.
    file: Option<File>,
}

impl DocumentLock {
    /// Acquire the lock, waiting up to `timeout`.
    ///
    /// Creates the lock file (and its directory) if needed, then retries a
    /// non-blocking exclusive lock every [`LOCK_POLL_INTERVAL`] until it
    /// succeeds or the deadline passes. A zero timeout makes exactly one
    /// attempt.
    ///
    /// # Errors
    ///
    /// - [`LockError::Timeout`] if the lock is still held at the deadline
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock call fails
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let started = Instant::now();
        let deadline = started + timeout;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LockError::CreateFailed(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        loop {
            if let Some(lock) = Self::try_acquire(path)? {
                tracing::trace!(path = %path.display(), waited = ?started.elapsed(), "lock acquired");
                return Ok(lock);
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(path = %path.display(), ?timeout, "lock acquisition timed out");
                return Err(LockError::Timeout {
                    path: path.to_path_buf(),
                    waited: started.elapsed(),
                });
            }
            thread::sleep(LOCK_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Ok(None)` if someone else holds it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                path: path.to_path_buf(),
                file: Some(file),
            })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock explicitly.
    ///
    /// This is called automatically on drop, but can be called early
    /// if you need to release the lock before the guard goes out of scope.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
            tracing::trace!(path = %self.path.display(), "lock released");
        }
        Ok(())
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        // Best-effort release on drop - ignore errors since we're dropping
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
