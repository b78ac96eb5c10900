//! Exclusive locking of the persisted content cache.
//!
//! Two concurrent `rserv` runs would each load the cache, scan, and write it
//! back, so the later writer silently discards the earlier one's results. A
//! [`CacheLock`] serializes whole command runs instead. The lock is advisory
//! (fs4) and the OS releases it when the holding process exits.

use anyhow::{Context, Result, bail};
use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

/// Holds the exclusive lock on a cache file until dropped.
#[derive(Debug)]
pub struct CacheLock {
    /// Lock file handle
    lock_file: File,
    /// Path to the lock file (for error messages)
    lock_path: PathBuf,
}

impl CacheLock {
    /// Acquire the lock guarding `cache_path`, waiting briefly if another run holds it.
    ///
    /// The lock lives next to the cache as `<cache>.lock`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cache directory cannot be created
    /// - The lock file cannot be created
    /// - Another run keeps holding the lock past the timeout
    pub fn acquire(cache_path: &Path) -> Result<Self> {
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }

        let lock_path = lock_path_for(cache_path);
        let lock_file = Self::try_acquire_lock(&lock_path)?;
        debug!(lock = %lock_path.display(), "Acquired cache lock");

        Ok(Self {
            lock_file,
            lock_path,
        })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// Try to acquire the lock file
    fn try_acquire_lock(lock_path: &Path) -> Result<File> {
        // Use shorter timeouts in test mode for faster test execution
        let lock_timeout = if cfg!(test) {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(30)
        };
        let retry_interval = if cfg!(test) {
            Duration::from_millis(10)
        } else {
            Duration::from_millis(100)
        };

        let start = Instant::now();

        loop {
            let file = File::options()
                .create(true)
                .truncate(false)
                .write(true)
                .open(lock_path)
                .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

            match file.try_lock_exclusive() {
                Ok(true) => {
                    let mut file_ref = &file;
                    // Owner details are only a debugging aid
                    let _ = file.set_len(0);
                    let _ = writeln!(
                        file_ref,
                        "pid={}\ntime={}",
                        std::process::id(),
                        humantime::format_rfc3339(SystemTime::now())
                    );
                    return Ok(file);
                }
                Ok(false) | Err(_) if start.elapsed() < lock_timeout => {
                    std::thread::sleep(retry_interval);
                }
                Ok(false) | Err(_) => {
                    bail!(
                        "Another rserv run is using the content cache. \
                         Please wait for it to finish (lock: {})",
                        lock_path.display()
                    );
                }
            }
        }
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
        // Leave the file in place; removing it would race with a waiter that
        // already opened it.
        debug!(lock = %self.lock_path.display(), "Released cache lock");
    }
}

/// `<cache>.lock` next to the cache file.
fn lock_path_for(cache_path: &Path) -> PathBuf {
    let mut name = cache_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lock");
    cache_path.with_file_name(name)
}
