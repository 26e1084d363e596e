//! core::store
//!
//! Locked read-modify-write access to the shared configuration document.
//!
//! # Architecture
//!
//! A [`Store`] is a handle on `<dir>/config.toml`. It keeps a private
//! in-memory copy of the document for reads (`get`, `section`,
//! `unmarshal`), which are never locked and go stale once another process
//! writes. Every write goes through one cycle:
//!
//! 1. Acquire the document lock (bounded wait)
//! 2. Re-read the document from storage
//! 3. Apply a single-section mutation
//! 4. Stamp `<section>.updated` with the injected clock
//! 5. Serialize the whole document and write it atomically
//! 6. Replace the in-memory copy, release the lock
//!
//! Because the document is re-read under the lock, writers touching
//! different sections never lose each other's changes. Writers touching the
//! same section resolve last-writer-wins in lock order.
//!
//! # Batches
//!
//! With [`Store::set_auto_write`] off, mutations apply to the in-memory copy
//! and are queued. [`Store::write`] replays the queue against a fresh read
//! in a single cycle. A failed call is never queued; a caller that sees one
//! should [`Store::discard`] instead of writing.
//!
//! # Example
//!
//! ```no_run
//! use cacophony_config::core::sections::Windows;
//! use cacophony_config::core::store::Store;
//!
//! let mut store = Store::open("/etc/cacophony")?;
//! let windows: Windows = store.unmarshal()?;
//! store.set_field("windows", "power-on", "-45m", false)?;
//! # let _ = windows;
//! # Ok::<(), cacophony_config::core::store::StoreError>(())
//! ```

pub mod document;
mod mutation;
pub mod storage;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use toml::{Table, Value};

use crate::core::clock::{Clock, SystemClock};
use crate::core::codec::{
    coerce, lowercase_keys, strip_zero_values, unknown_keys, CodecError, Section,
    UPDATED_KEY,
};
use crate::core::ops::lock::{DocumentLock, LockError, DEFAULT_LOCK_TIMEOUT};
use crate::core::paths::ConfigPaths;
use crate::core::registry::{Registry, SectionDescriptor};

pub use document::PathError;
pub use storage::{DocumentStorage, MemoryStorage, OsStorage};

use mutation::Mutation;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document lock was not acquired in time. Retryable.
    #[error("timed out after {waited:?} waiting for config lock '{path}'")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("unknown field '{field}' in section '{section}'")]
    UnknownField { section: String, field: String },

    #[error("invalid value for section '{section}': {reason}")]
    InvalidField { section: String, reason: String },

    /// Stored content does not decode into the requested section.
    #[error("failed to decode stored config: {0}")]
    Decode(#[from] CodecError),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Lock(LockError),
}

impl From<LockError> for StoreError {
    fn from(error: LockError) -> Self {
        match error {
            LockError::Timeout { path, waited } => StoreError::LockTimeout { path, waited },
            other => StoreError::Lock(other),
        }
    }
}

/// Builder for [`Store`].
#[derive(Debug)]
pub struct StoreBuilder {
    paths: ConfigPaths,
    registry: Option<Arc<Registry>>,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn DocumentStorage>,
    lock_timeout: Duration,
}

impl StoreBuilder {
    fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            registry: None,
            clock: Arc::new(SystemClock),
            storage: Arc::new(OsStorage),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Sections known to the store. Defaults to [`Registry::builtin`].
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage(mut self, storage: Arc<dyn DocumentStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Lock file location. Defaults to `<document>.lock`.
    pub fn lock_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths = self.paths.with_lock_path(path);
        self
    }

    /// Load the document and return the handle.
    pub fn open(self) -> Result<Store, StoreError> {
        let mut store = Store {
            paths: self.paths,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(Registry::builtin())),
            clock: self.clock,
            storage: self.storage,
            lock_timeout: self.lock_timeout,
            document: Table::new(),
            auto_write: true,
            pending: Vec::new(),
        };
        store.update()?;
        tracing::debug!(
            path = %store.paths.document_path().display(),
            sections = store.document.len(),
            "opened config"
        );
        Ok(store)
    }
}

/// Handle on one configuration document.
#[derive(Debug)]
pub struct Store {
    paths: ConfigPaths,
    registry: Arc<Registry>,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn DocumentStorage>,
    lock_timeout: Duration,
    document: Table,
    auto_write: bool,
    pending: Vec<Mutation>,
}

impl Store {
    /// Open `<dir>/config.toml` with default settings.
    ///
    /// A missing file is an empty document.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::builder(dir).open()
    }

    pub fn builder(dir: impl Into<PathBuf>) -> StoreBuilder {
        StoreBuilder::new(ConfigPaths::new(dir))
    }

    /// Builder for an already resolved set of paths.
    pub fn builder_for(paths: ConfigPaths) -> StoreBuilder {
        StoreBuilder::new(paths)
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn document_path(&self) -> PathBuf {
        self.paths.document_path()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The in-memory document as last loaded or written.
    pub fn document(&self) -> &Table {
        &self.document
    }

    // --- reads ---

    /// Raw value at a dotted key, e.g. `location.latitude`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let path = document::split_key(key).ok()?;
        document::get(&self.document, &path)
    }

    /// Raw map of a section (or any top-level table).
    pub fn section(&self, key: &str) -> Option<&Table> {
        self.document.get(&key.to_lowercase())?.as_table()
    }

    /// Decode section `S`, starting from its zero value.
    pub fn unmarshal<S: Section>(&self) -> Result<S, StoreError> {
        let mut value = S::default();
        self.unmarshal_into(&mut value)?;
        Ok(value)
    }

    /// Decode section `S` over `out`.
    ///
    /// Stored keys replace the matching fields of `out`; fields missing from
    /// the document keep their current value, so passing a section's
    /// defaults yields "stored value or default".
    pub fn unmarshal_into<S: Section>(&self, out: &mut S) -> Result<(), StoreError> {
        let Some(stored) = self.section(S::KEY) else {
            return Ok(());
        };
        let mut merged = out.to_map();
        for (key, value) in stored {
            merged.insert(key.to_lowercase(), value.clone());
        }
        *out = S::from_map(&merged)?;
        Ok(())
    }

    // --- writes ---

    /// Replace section `S` with `value`, zero values included.
    pub fn set<S: Section>(&mut self, value: &S) -> Result<(), StoreError> {
        self.descriptor(S::KEY)?;
        value.validate().map_err(|e| invalid(S::KEY, e))?;
        self.apply(Mutation::Replace {
            section: S::KEY.to_string(),
            map: value.to_map(),
        })
    }

    /// Replace a registered section with `map` as given.
    pub fn set_raw(&mut self, key: &str, map: Table) -> Result<(), StoreError> {
        let descriptor = self.descriptor(key)?;
        let mut map = lowercase_keys(map);
        map.remove(UPDATED_KEY);
        self.apply(Mutation::Replace {
            section: descriptor.key().to_string(),
            map,
        })
    }

    /// Replace a section from a loosely typed map.
    ///
    /// The map is decoded through the section codec and stored in its
    /// sparse canonical form, so zero values are omitted. Without `force`,
    /// unknown keys or values the codec or validator reject fail with
    /// [`StoreError::InvalidField`] and nothing is written. With `force`,
    /// unknown keys are stored verbatim and values that do not coerce are
    /// stored as given.
    pub fn set_from_map(&mut self, key: &str, map: Table, force: bool) -> Result<(), StoreError> {
        let descriptor = *self.descriptor(key)?;
        let section = descriptor.key();
        let mut map = lowercase_keys(map);
        map.remove(UPDATED_KEY);
        let unknown = unknown_keys(descriptor.fields(), &map);

        let stored = if force {
            if !unknown.is_empty() {
                tracing::warn!(section, keys = ?unknown, "forcing unknown keys into config");
            }
            let mut stored = match descriptor.normalize(&map) {
                Ok(normalized) => normalized,
                Err(e) => {
                    tracing::warn!(section, error = %e, "forcing section that fails validation");
                    coerce_fields(&descriptor, &map)
                }
            };
            for key in unknown {
                if let Some(value) = map.remove(&key) {
                    stored.insert(key, value);
                }
            }
            stored
        } else {
            if !unknown.is_empty() {
                return Err(invalid(
                    section,
                    CodecError::UnknownKeys {
                        section: section.to_string(),
                        keys: unknown,
                    },
                ));
            }
            descriptor.normalize(&map).map_err(|e| invalid(section, e))?
        };

        self.apply(Mutation::Replace {
            section: section.to_string(),
            map: stored,
        })
    }

    /// Merge a single field into a section, coercing `value` to the
    /// field's declared type.
    ///
    /// The rest of the section is left as stored. Without `force`, an
    /// undeclared field fails with [`StoreError::UnknownField`] and a value
    /// that does not coerce (or a merged section that fails validation)
    /// fails with [`StoreError::InvalidField`]. With `force`, the value is
    /// written as text, and dotted field names create nested tables.
    pub fn set_field(
        &mut self,
        section: &str,
        field: &str,
        value: &str,
        force: bool,
    ) -> Result<(), StoreError> {
        let descriptor = *self.descriptor(section)?;
        let section = descriptor.key();
        let field_path = document::split_key(field)?;
        let raw = Value::String(value.to_string());

        let declared = match field_path.as_slice() {
            [name] => descriptor.field(name),
            _ => None,
        };

        let (stored, check) = match declared {
            Some(spec) => match coerce::canonical(spec.kind, &raw) {
                Ok(coerced) => (coerced, (!force).then_some(descriptor)),
                Err(mismatch) if force => {
                    tracing::warn!(
                        section,
                        field = spec.name,
                        expected = mismatch.expected,
                        "forcing value that does not match field type"
                    );
                    (raw, None)
                }
                Err(mismatch) => {
                    return Err(invalid(
                        section,
                        CodecError::mismatch(section, spec.name, mismatch),
                    ))
                }
            },
            None if force => {
                tracing::warn!(section, field, "forcing unknown field into config");
                (raw, None)
            }
            None => {
                return Err(StoreError::UnknownField {
                    section: section.to_string(),
                    field: field_path.join("."),
                })
            }
        };

        let mut path = Vec::with_capacity(field_path.len() + 1);
        path.push(section.to_string());
        path.extend(field_path);

        self.apply(Mutation::Field {
            section: section.to_string(),
            path,
            value: stored,
            check,
        })
    }

    /// Remove a field, a nested value or a whole section.
    ///
    /// Removing something that is not there succeeds without writing.
    /// The owning registered section's `updated` is stamped; a removed
    /// section is left holding only its stamp.
    pub fn unset(&mut self, key: &str) -> Result<(), StoreError> {
        let path = document::split_key(key)?;
        let section = &path[0];
        let stamp = self
            .registry
            .contains(section)
            .then(|| section.clone());
        self.apply(Mutation::Unset { path, stamp })
    }

    // --- synchronization ---

    /// Re-read the document from storage under the lock.
    ///
    /// Queued batch mutations are re-applied on top of the fresh copy.
    pub fn update(&mut self) -> Result<(), StoreError> {
        let loaded = {
            let _lock = self.lock()?;
            self.load()?
        };
        let mut document = loaded;
        let now = self.clock.now();
        for mutation in &self.pending {
            mutation.apply(&mut document, &now)?;
        }
        self.document = document;
        Ok(())
    }

    /// Enable or disable writing after every mutation.
    ///
    /// Turning auto-write back on does not flush queued mutations; call
    /// [`Store::write`] for that.
    pub fn set_auto_write(&mut self, enabled: bool) {
        self.auto_write = enabled;
    }

    pub fn auto_write(&self) -> bool {
        self.auto_write
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Persist queued mutations in one locked cycle.
    pub fn write(&mut self) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let pending = std::mem::take(&mut self.pending);
        match self.commit(&pending) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.pending = pending;
                Err(e)
            }
        }
    }

    /// Drop queued mutations and reload from storage.
    pub fn discard(&mut self) -> Result<(), StoreError> {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "discarding queued config changes");
        }
        self.pending.clear();
        self.update()
    }

    // --- internals ---

    fn descriptor(&self, key: &str) -> Result<&SectionDescriptor, StoreError> {
        self.registry
            .get(&key.to_lowercase())
            .ok_or_else(|| StoreError::UnknownSection(key.to_string()))
    }

    fn lock(&self) -> Result<DocumentLock, StoreError> {
        let path = self.paths.lock_path();
        let lock = DocumentLock::acquire(&path, self.lock_timeout)?;
        tracing::debug!(path = %path.display(), "acquired config lock");
        Ok(lock)
    }

    fn load(&self) -> Result<Table, StoreError> {
        let path = self.paths.document_path();
        let text = self.storage.read(&path).map_err(|source| StoreError::Io {
            action: "read",
            path: path.clone(),
            source,
        })?;
        match text {
            Some(text) => {
                document::parse(&text).map_err(|source| StoreError::Parse { path, source })
            }
            None => Ok(Table::new()),
        }
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        if self.auto_write {
            return self.commit(std::slice::from_ref(&mutation));
        }
        let mut staged = self.document.clone();
        mutation.apply(&mut staged, &self.clock.now())?;
        self.document = staged;
        self.pending.push(mutation);
        Ok(())
    }

    /// Lock, reload, apply, write, swap.
    fn commit(&mut self, mutations: &[Mutation]) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let mut document = self.load()?;
        let now = self.clock.now();

        let mut changed = false;
        for mutation in mutations {
            changed |= mutation.apply(&mut document, &now)?;
        }

        if changed {
            let path = self.paths.document_path();
            let text = document::serialize(&document)?;
            self.storage
                .write(&path, &text)
                .map_err(|source| StoreError::Io {
                    action: "write",
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(
                path = %path.display(),
                sections = ?mutations.iter().map(Mutation::section).collect::<Vec<_>>(),
                "wrote config"
            );
        }

        self.document = document;
        Ok(())
    }
}

fn invalid(section: &str, error: CodecError) -> StoreError {
    StoreError::InvalidField {
        section: section.to_string(),
        reason: error.to_string(),
    }
}

/// Field-by-field coercion for forced maps: values that coerce are stored
/// canonically, the rest as given. Zero values are dropped.
fn coerce_fields(descriptor: &SectionDescriptor, map: &Table) -> Table {
    let mut out = Table::new();
    for field in descriptor.fields() {
        let Some(value) = map.get(field.name) else {
            continue;
        };
        let stored = coerce::canonical(field.kind, value).unwrap_or_else(|_| value.clone());
        out.insert(field.name.to_string(), stored);
    }
    strip_zero_values(descriptor.fields(), out)
}
