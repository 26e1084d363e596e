//! cli
//!
//! Command-line interface layer for cacophony-config.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the config directory
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and turns them into
//! [`Store`] calls. All document changes flow through the store's locked
//! write cycle.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::paths::ConfigPaths;
use crate::core::store::Store;
use crate::ui::output::Verbosity;
use anyhow::{Context as _, Result};

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: ConfigPaths,
    pub debug: bool,
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Open the store for the resolved config directory.
    pub fn open_store(&self) -> Result<Store> {
        Store::builder_for(self.paths.clone())
            .open()
            .with_context(|| format!("Failed to open config in {}", self.paths.dir().display()))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        paths: ConfigPaths::resolve(cli.config.as_deref()),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
