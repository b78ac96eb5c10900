//! Persisted content cache.
//!
//! The cache keeps scan results between runs so that VCS probes and integrity
//! scans younger than the update interval are not repeated. It is a zstd
//! compressed bincode document. Each entry is encoded as its own blob inside
//! the document, so a single record that no longer decodes (or fails its
//! consistency checks) is dropped without losing the rest.

use crate::content::{ContentEntry, ContentRepository, ScanLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Bumped whenever the on-disk layout changes.
pub const CACHE_VERSION: u32 = 1;

/// zstd level used for the cache file.
const COMPRESSION_LEVEL: i32 = 3;

/// Failures reading or writing the cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The file could not be read or written.
    #[error("cache I/O failed for {}: {source}", path.display())]
    Io {
        /// Cache file.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The file is not a readable cache document.
    #[error("cache file is corrupt: {0}")]
    Corrupt(String),

    /// The file was written by an incompatible release.
    #[error("cache format version {found} is not supported (expected {CACHE_VERSION})")]
    Version {
        /// Version found in the file.
        found: u32,
    },

    /// Encoding the repository failed.
    #[error("failed to encode cache: {0}")]
    Encode(String),
}

/// Top-level document.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    root_path: PathBuf,
    scan_level: ScanLevel,
    scan_time: Option<DateTime<Utc>>,
    /// One bincode blob per [`ContentEntry`].
    entries: Vec<Vec<u8>>,
}

/// Get the bincode configuration
fn bincode_config() -> impl bincode::config::Config {
    // Limit allocation to prevent memory exhaustion on corrupt data
    bincode::config::legacy().with_limit::<{ 64 * 1024 * 1024 }>()
}

/// Load the snapshot stored at `path`.
///
/// Returns `Ok(None)` when no cache has been written yet.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, is corrupt, or
/// was written with a different format version. Callers are expected to
/// warn and continue without a snapshot.
pub fn load(path: &Path) -> Result<Option<ContentRepository>, CacheError> {
    let compressed = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(cache = %path.display(), "No content cache yet");
            return Ok(None);
        }
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    decode(&compressed).map(Some)
}

/// Write `repo` to `path`, replacing any previous cache atomically.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn save(path: &Path, repo: &ContentRepository) -> Result<(), CacheError> {
    let bytes = encode(repo)?;
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(&bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(cache = %path.display(), entries = repo.len(), bytes = bytes.len(), "Saved content cache");
    Ok(())
}

/// Serialize and compress a repository.
pub(crate) fn encode(repo: &ContentRepository) -> Result<Vec<u8>, CacheError> {
    let entries = repo
        .entries()
        .map(|entry| {
            bincode::serde::encode_to_vec(entry, bincode_config())
                .map_err(|e| CacheError::Encode(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let document = CacheFile {
        version: CACHE_VERSION,
        root_path: repo.root_path().to_path_buf(),
        scan_level: repo.scan_level().recorded(),
        scan_time: repo.scan_time(),
        entries,
    };

    let serialized = bincode::serde::encode_to_vec(&document, bincode_config())
        .map_err(|e| CacheError::Encode(e.to_string()))?;
    zstd::encode_all(&serialized[..], COMPRESSION_LEVEL).map_err(|e| CacheError::Encode(e.to_string()))
}

/// Decompress and decode a cache document, skipping unusable entries.
pub(crate) fn decode(compressed: &[u8]) -> Result<ContentRepository, CacheError> {
    let serialized = zstd::decode_all(compressed).map_err(|e| CacheError::Corrupt(e.to_string()))?;
    let (document, _): (CacheFile, usize) =
        bincode::serde::decode_from_slice(&serialized, bincode_config())
            .map_err(|e| CacheError::Corrupt(e.to_string()))?;

    if document.version != CACHE_VERSION {
        return Err(CacheError::Version {
            found: document.version,
        });
    }

    let total = document.entries.len();
    let entries: Vec<ContentEntry> = document
        .entries
        .iter()
        .enumerate()
        .filter_map(|(index, blob)| {
            match bincode::serde::decode_from_slice::<ContentEntry, _>(blob, bincode_config()) {
                Ok((entry, _)) if entry.is_well_formed() => Some(entry),
                Ok((entry, _)) => {
                    warn!(index, name = %entry.nice_name, "Skipping inconsistent cache entry");
                    None
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping undecodable cache entry");
                    None
                }
            }
        })
        .collect();

    debug!(kept = entries.len(), total, "Decoded content cache");
    Ok(ContentRepository::from_parts(
        document.root_path,
        entries,
        document.scan_level,
        document.scan_time,
    ))
}
