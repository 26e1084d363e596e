//! core
//!
//! Core types, codecs and the document store for cacophony-config.
//!
//! # Modules
//!
//! - [`codec`] - Section trait, field schema and weak-typing coercions
//! - [`sections`] - Built-in section declarations
//! - [`registry`] - Table of known sections
//! - [`clock`] - Injectable time source for `updated` stamps
//! - [`paths`] - Config directory and file locations
//! - [`ops`] - Cross-process document locking
//! - [`store`] - Locked read-modify-write document store
//!
//! # Design Principles
//!
//! - Each section owns its schema; the store only routes by key
//! - Writes touch exactly one section and never lose another's changes
//! - Strict validation by default, with an explicit force escape hatch

pub mod clock;
pub mod codec;
pub mod ops;
pub mod paths;
pub mod registry;
pub mod sections;
pub mod store;
