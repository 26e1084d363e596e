//! cacophony-config - Shared configuration store for Cacophony devices
//!
//! Every program on a device reads its settings from one TOML document,
//! `/etc/cacophony/config.toml`, split into named sections (`device`,
//! `location`, `windows`, ...). Each section is typed and validated by its
//! own codec and can be updated independently by any process.
//!
//! # Architecture
//!
//! - [`core`] - Section codecs, registry, file lock and the document store
//! - [`cli`] - The `cacophony-config` command-line front end
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Every write re-reads the document under an exclusive file lock
//! 2. A write touches exactly one section and stamps its `updated` time
//! 3. The document is replaced atomically and never partially written
//! 4. Writes are type-checked against the section schema unless forced
//!
//! # Example
//!
//! ```no_run
//! use cacophony_config::core::sections::Location;
//! use cacophony_config::core::store::Store;
//!
//! let mut store = Store::open("/etc/cacophony")?;
//! store.set_field("location", "latitude", "-43.53", false)?;
//! let location: Location = store.unmarshal()?;
//! # let _ = location;
//! # Ok::<(), cacophony_config::core::store::StoreError>(())
//! ```

pub mod cli;
pub mod core;
pub mod ui;
