//! Small path and time helpers shared across the crate.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Expands a leading `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty or the home directory cannot be found.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("Path cannot be empty");
    }

    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("Could not find home directory")?;
            Ok(if rest.as_os_str().is_empty() {
                home
            } else {
                home.join(rest)
            })
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// `path` relative to `base`, or `path` unchanged when it is not below `base`.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

/// Human readable age of `then`, e.g. `"12m 4s ago"`, rounded to seconds.
#[must_use]
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now
        .signed_duration_since(then)
        .to_std()
        .unwrap_or(Duration::ZERO);
    let rounded = Duration::from_secs(elapsed.as_secs());
    if rounded.is_zero() {
        "just now".to_string()
    } else {
        format!("{} ago", humantime::format_duration(rounded))
    }
}
