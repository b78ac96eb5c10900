//! Command-line interface definitions for rserv.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes, so we
//! allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for rserv.
#[derive(Parser)]
#[command(
    name = "rserv",
    version = crate::VERSION,
    about = "Keeps game server content checkouts current and consistent",
    long_about = "Checks the version-control status of every content source, updates \
                  out-of-date checkouts, and repairs dangling links and missing \
                  lowercase aliases"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from FILE
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rerun checks even if cached results are recent
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Only print what would be done, don't change anything
    #[arg(short, long, global = true)]
    pub pretend: bool,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use the closest match when a name can't be found
    #[arg(short = 'a', long, global = true, overrides_with = "no_assume")]
    pub assume: bool,

    /// Only suggest the closest match when a name can't be found
    #[arg(long, global = true, overrides_with = "assume")]
    pub no_assume: bool,
}

impl Cli {
    /// Explicit `--assume`/`--no-assume` choice, if any.
    #[must_use]
    pub const fn assume_override(&self) -> Option<bool> {
        match (self.assume, self.no_assume) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Check and report the status of all content
    Status,

    /// Manage content sources
    Content {
        #[command(subcommand)]
        action: Option<ContentAction>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Content subcommands; `list` is the default.
#[derive(Subcommand, Clone)]
pub enum ContentAction {
    /// List all content sources
    List,

    /// Check the status of content sources
    Status {
        /// Content names (default: all)
        names: Vec<String>,
    },

    /// Update out-of-date content sources
    Update {
        /// Content names (default: all)
        names: Vec<String>,
    },

    /// Fix dangling links and missing lowercase aliases
    Rescue {
        /// Content names (default: all)
        names: Vec<String>,
    },
}
