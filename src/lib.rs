#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # rserv - Game Server Content Manager
//!
//! rserv keeps a directory of game-server content checkouts healthy. Each
//! subdirectory of the content root is one content source, usually a
//! Subversion or Git checkout of an addon.
//!
//! ## Features
//!
//! - **Status probing**: asks each checkout's VCS whether upstream has moved on
//! - **Updating**: pulls out-of-date checkouts
//! - **Integrity scanning**: finds dangling symlinks and files whose lowercase
//!   alias is missing, which case-insensitive game engines trip over
//! - **Rescue**: removes dangling links and creates lowercase alias links
//! - **Cached results**: checks are repeated at most once per update interval
//!
//! ## Architecture
//!
//! - [`content`]: the content repository, its entries and scan levels
//! - [`vcs`]: Subversion/Git status probes and updates
//! - [`scanner`]: dangling link and case collision detection and repair
//! - [`process`]: subprocess execution with timeouts
//! - [`cache`]: persisted scan results
//! - [`commands`]: CLI command implementations
//! - [`config`]: configuration parsing and validation
//! - [`output`]: terminal output and verbosity
//!
//! ## Example Usage
//!
//! ```no_run
//! use rserv::content::{ContentFilter, ContentRepository, ScanContext, ScanLevel, ScanOptions};
//! use rserv::process::SystemRunner;
//! use std::time::Duration;
//!
//! # fn main() -> anyhow::Result<()> {
//! let runner = SystemRunner::new(Duration::from_secs(120));
//! let ctx = ScanContext::new(&runner, ScanOptions::default());
//! let mut repo = ContentRepository::new("/srv/content");
//!
//! repo.scan(&ctx, ScanLevel::Full, &ContentFilter::all(), |entry| {
//!     println!("{} {}", entry.nice_name, entry.status.badge());
//! })?;
//! # Ok(())
//! # }
//! ```

/// Persisted scan results.
pub mod cache;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Content repository, entries and scanning.
pub mod content;

/// Exclusive locking of the content cache.
pub mod lock;

/// Tracing subscriber setup.
pub mod logging;

/// Output formatting and verbosity.
pub mod output;

/// Subprocess execution.
pub mod process;

/// Filesystem integrity checks and repair.
pub mod scanner;

/// Utility functions and helpers.
pub mod utils;

/// Version-control probing and updating.
pub mod vcs;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use content::{ScanContext, ScanOptions};
use process::SystemRunner;
use std::path::PathBuf;
use std::time::Duration;

/// Current version of the rserv binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default age after which a cached check is repeated.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/rserv/config.toml";

/// Default cache file path relative to home directory.
pub const DEFAULT_CACHE_PATH: &str = ".local/share/rserv/cache.bin";

/// Central context for all rserv commands.
///
/// Holds the resolved configuration, the paths derived from it, and the
/// switches given on the command line.
///
/// # Examples
///
/// ```no_run
/// use rserv::RservContext;
/// use rserv::content::ScanOptions;
///
/// # fn main() -> anyhow::Result<()> {
/// // Configuration from the default location or RSERV_CONFIG_PATH
/// let ctx = RservContext::new(None, ScanOptions::default())?;
///
/// // Explicit paths (for testing)
/// let ctx = RservContext::new_explicit(
///     "/tmp/content".into(),
///     "/tmp/cache.bin".into(),
///     "/tmp/config.toml".into(),
///     ScanOptions::default(),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RservContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Directory holding the content sources.
    pub content_path: PathBuf,

    /// Location of the persisted cache.
    pub cache_path: PathBuf,

    /// Switches for this invocation.
    pub options: ScanOptions,

    /// Whether unknown names resolve to their closest match.
    pub assume: bool,

    /// Executes VCS commands.
    runner: SystemRunner,

    /// Parsed `scan.update_interval`.
    update_interval: Duration,
}

impl RservContext {
    /// Creates a context from the configuration file.
    ///
    /// The file is `config_override` when given, else `RSERV_CONFIG_PATH`, else
    /// the default location. Only the default location is created when
    /// missing. `RSERV_CONTENT_PATH` overrides the configured content path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined, an explicit
    /// configuration file does not exist, or the configuration is invalid.
    pub fn new(config_override: Option<PathBuf>, options: ScanOptions) -> Result<Self> {
        let config_path = match config_override {
            Some(path) => {
                let path = utils::expand_tilde(&path)?;
                if !path.is_file() {
                    anyhow::bail!("Configuration file {} does not exist", path.display());
                }
                path
            }
            None => {
                if let Ok(path) = std::env::var("RSERV_CONFIG_PATH") {
                    PathBuf::from(path)
                } else {
                    let home = dirs::home_dir().context("Could not find home directory")?;
                    home.join(DEFAULT_CONFIG_PATH)
                }
            }
        };

        let config = config::Config::load(&config_path)?;

        // Validate configuration and warn about issues
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Warning: Configuration validation failed: {e}"));
        }

        let content_path = if let Ok(path) = std::env::var("RSERV_CONTENT_PATH") {
            PathBuf::from(path)
        } else {
            utils::expand_tilde(&config.core.content_path)?
        };
        let cache_path = utils::expand_tilde(&config.core.cache_path)?;

        Self::assemble(config_path, config, content_path, cache_path, options)
    }

    /// Creates a context with explicit paths for testing.
    ///
    /// The configuration file is created with defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(
        content_path: PathBuf,
        cache_path: PathBuf,
        config_path: PathBuf,
        options: ScanOptions,
    ) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Self::assemble(config_path, config, content_path, cache_path, options)
    }

    /// Resolve config-derived settings.
    fn assemble(
        config_path: PathBuf,
        config: config::Config,
        content_path: PathBuf,
        cache_path: PathBuf,
        options: ScanOptions,
    ) -> Result<Self> {
        let update_interval = config.update_interval()?;
        let runner = SystemRunner::new(config.command_timeout()?);
        let assume = config.names.assume;

        Ok(Self {
            config_path,
            config,
            content_path,
            cache_path,
            options,
            assume,
            runner,
            update_interval,
        })
    }

    /// The process runner used for VCS commands.
    #[must_use]
    pub const fn runner(&self) -> &SystemRunner {
        &self.runner
    }

    /// Scan context carrying this run's options and configured interval.
    #[must_use]
    pub fn scan_context(&self) -> ScanContext<'_> {
        ScanContext::new(&self.runner, self.options).with_update_interval(self.update_interval)
    }
}
