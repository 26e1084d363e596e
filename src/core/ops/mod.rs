//! core::ops
//!
//! Cross-process coordination for document writes.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive document lock
//!
//! # Architecture
//!
//! Every mutating store operation:
//! 1. Acquires the exclusive document lock, waiting up to its timeout
//! 2. Re-reads, modifies and rewrites the document
//! 3. Releases the lock when the guard drops, on success or failure

pub mod lock;
