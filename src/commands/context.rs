use anyhow::{Context, Result};

use crate::RservContext;
use crate::cache;
use crate::content::{ContentRepository, merge};
use crate::lock::CacheLock;
use crate::output;

/// Trait providing common operations for command modules
pub trait CommandContext {
    /// Takes the exclusive cache lock for the rest of the command
    ///
    /// # Errors
    ///
    /// Returns an error if another run holds the lock
    fn lock_cache(&self) -> Result<CacheLock>;

    /// Builds the content repository, folding in the persisted cache
    ///
    /// An unreadable cache is reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the content directory cannot be listed
    fn open_repository(&self) -> Result<ContentRepository>;

    /// Writes the repository back to the cache
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file cannot be written
    fn persist_repository(&self, repo: &ContentRepository) -> Result<()>;
}

impl CommandContext for RservContext {
    fn lock_cache(&self) -> Result<CacheLock> {
        CacheLock::acquire(&self.cache_path)
    }

    fn open_repository(&self) -> Result<ContentRepository> {
        let fresh = ContentRepository::new(&self.content_path);
        let snapshot = match cache::load(&self.cache_path) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                output::warning(&format!("Ignoring content cache: {e}"));
                None
            }
        };

        let Some(snapshot) = snapshot else {
            return Ok(fresh);
        };

        merge(fresh, &snapshot, &self.scan_context()).with_context(|| {
            format!(
                "Failed to read content directory {}",
                self.content_path.display()
            )
        })
    }

    fn persist_repository(&self, repo: &ContentRepository) -> Result<()> {
        cache::save(&self.cache_path, repo)
            .with_context(|| format!("Failed to write cache {}", self.cache_path.display()))
    }
}
