//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <dir>` / `-c`: Config directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Read and write the Cacophony device configuration
#[derive(Parser, Debug)]
#[command(name = "cacophony-config")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config directory [default: $CACOPHONY_CONFIG_DIR or /etc/cacophony]
    #[arg(short = 'c', long = "config", global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print configuration sections
    #[command(
        name = "read",
        long_about = "Print the stored values of one or more sections.\n\n\
            Only values present in the config file are shown; fields that were \
            never set fall back to each program's defaults and are not listed.",
        after_help = "\
EXAMPLES:
    # Show where the device is
    cacophony-config read location

    # Several sections as JSON
    cacophony-config read device windows --json"
    )]
    Read {
        /// Sections to print
        #[arg(required = true, value_name = "SECTION")]
        sections: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set configuration fields
    #[command(
        name = "write",
        long_about = "Set one or more fields given as section.field=value.\n\n\
            Values are checked against each field's type. All settings are \
            applied together: if any of them is rejected, nothing is written.",
        after_help = "\
EXAMPLES:
    # Move the recording window
    cacophony-config write windows.start-recording=-1h windows.stop-recording=+1h

    # Store a field this version does not know about
    cacophony-config write --force thermal-recorder.experimental=1"
    )]
    Write {
        /// Skip type and schema checks
        #[arg(short, long)]
        force: bool,

        /// Settings as section.field=value
        #[arg(required = true, value_name = "SECTION.FIELD=VALUE")]
        settings: Vec<String>,
    },

    /// Remove fields or whole sections
    #[command(
        name = "delete",
        after_help = "\
EXAMPLES:
    # Forget one field
    cacophony-config delete location.accuracy

    # Forget a whole section
    cacophony-config delete test-hosts"
    )]
    Delete {
        /// Keys as section or section.field
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,
    },

    /// List known sections and their fields
    Sections {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    cacophony-config completion bash > /etc/bash_completion.d/cacophony-config

    # Zsh
    cacophony-config completion zsh > \"${fpath[1]}/_cacophony-config\""
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
