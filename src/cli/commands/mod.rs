//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Opens the store and calls it
//! 3. Formats and displays output
//!
//! Any store error aborts the whole command; `main` prints it and exits
//! non-zero.

mod completion;
mod delete;
mod read;
mod sections;
mod write;

pub use completion::completion;
pub use delete::delete;
pub use read::read;
pub use sections::sections;
pub use write::{parse_settings, write, Setting};

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Read { sections, json } => read::read(ctx, &sections, json),
        Command::Write { force, settings } => write::write(ctx, &settings, force),
        Command::Delete { keys } => delete::delete(ctx, &keys),
        Command::Sections { json } => sections::sections(ctx, json),
        Command::Completion { shell } => completion::completion(shell),
    }
}
