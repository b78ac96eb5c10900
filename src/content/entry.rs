//! Per-directory cached scan results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Version-control synchronization state of a content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Local checkout matches its upstream.
    UpToDate,
    /// Upstream has changes the checkout does not.
    OutOfDate,
    /// Status could not be determined.
    Unknown {
        /// Short tag for the VCS involved (`"HG"`, `"GIT"`, `"??"`).
        kind: String,
        /// Human readable reason, phrased to follow the entry name.
        message: String,
    },
}

impl SyncStatus {
    /// Build an [`SyncStatus::Unknown`] value.
    #[must_use]
    pub fn unknown(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unknown {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Placeholder for entries that were discovered but never probed.
    #[must_use]
    pub fn unchecked() -> Self {
        Self::unknown("??", "has not been checked")
    }

    /// Short badge used in status tables: `[OK]`, `[UP]` or `[<kind>]`.
    #[must_use]
    pub fn badge(&self) -> String {
        match self {
            Self::UpToDate => "[OK]".to_string(),
            Self::OutOfDate => "[UP]".to_string(),
            Self::Unknown { kind, .. } => format!("[{kind}]"),
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => f.write_str("up to date"),
            Self::OutOfDate => f.write_str("out of date"),
            Self::Unknown { message, .. } => f.write_str(message),
        }
    }
}

/// Independently scheduled check classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    /// VCS status probe.
    Update,
    /// Dangling link and case collision scan.
    Issues,
}

/// A file whose lowercase alias is missing from disk.
///
/// Both paths are relative to the root the scan started from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseIssue {
    /// Path as it exists on disk.
    pub actual: PathBuf,
    /// Lowercased path that consumers will look for.
    pub alias: PathBuf,
}

impl CaseIssue {
    /// Create a collision pair.
    #[must_use]
    pub fn new(actual: impl Into<PathBuf>, alias: impl Into<PathBuf>) -> Self {
        Self {
            actual: actual.into(),
            alias: alias.into(),
        }
    }
}

/// Cached state for one content directory.
///
/// The issue lists are kept private so that an empty list is always stored as
/// `None`; [`ContentEntry::has_issues`] is derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Lowercase identity key.
    pub clean_name: String,
    /// Directory name as found on disk.
    pub nice_name: String,
    /// Absolute path of the directory.
    pub path: PathBuf,
    /// Last known VCS state.
    pub status: SyncStatus,
    /// Dangling symlinks, relative to `path`.
    link_issues: Option<Vec<PathBuf>>,
    /// Case collisions, relative to `path`.
    case_issues: Option<Vec<CaseIssue>>,
    /// When each check class last ran.
    pub timestamps: BTreeMap<CheckKind, DateTime<Utc>>,
}

impl ContentEntry {
    /// A shallow entry for the directory `nice_name` under `root`.
    #[must_use]
    pub fn new(root: &Path, nice_name: &str) -> Self {
        Self {
            clean_name: clean_name(nice_name),
            nice_name: nice_name.to_string(),
            path: root.join(nice_name),
            status: SyncStatus::unchecked(),
            link_issues: None,
            case_issues: None,
            timestamps: BTreeMap::new(),
        }
    }

    /// Whether any integrity problem is recorded.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.link_issues.is_some() || self.case_issues.is_some()
    }

    /// Recorded dangling symlinks.
    #[must_use]
    pub fn link_issues(&self) -> Option<&[PathBuf]> {
        self.link_issues.as_deref()
    }

    /// Recorded case collisions.
    #[must_use]
    pub fn case_issues(&self) -> Option<&[CaseIssue]> {
        self.case_issues.as_deref()
    }

    /// Replace the dangling symlink list.
    pub fn set_link_issues(&mut self, links: Vec<PathBuf>) {
        self.link_issues = non_empty(links);
    }

    /// Replace the case collision list.
    pub fn set_case_issues(&mut self, issues: Vec<CaseIssue>) {
        self.case_issues = non_empty(issues);
    }

    /// Drop both issue lists.
    pub fn clear_issues(&mut self) {
        self.link_issues = None;
        self.case_issues = None;
    }

    /// Whether `kind` has never run or last ran more than `interval` before `now`.
    #[must_use]
    pub fn is_stale(&self, kind: CheckKind, now: DateTime<Utc>, interval: Duration) -> bool {
        self.timestamps.get(&kind).is_none_or(|checked| {
            now.signed_duration_since(*checked)
                .to_std()
                .is_ok_and(|elapsed| elapsed > interval)
        })
    }

    /// Record that `kind` ran at `now`.
    pub fn touch(&mut self, kind: CheckKind, now: DateTime<Utc>) {
        self.timestamps.insert(kind, now);
    }

    /// Take status, issues and timestamps from a previously cached entry,
    /// keeping this entry's identity fields.
    pub fn adopt_checks(&mut self, cached: &Self) {
        self.status = cached.status.clone();
        self.link_issues.clone_from(&cached.link_issues);
        self.case_issues.clone_from(&cached.case_issues);
        self.timestamps.clone_from(&cached.timestamps);
    }

    /// Whether the record is internally consistent enough to trust.
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.clean_name.is_empty()
            && self.clean_name == clean_name(&self.nice_name)
            && self.link_issues.as_ref().is_none_or(|l| !l.is_empty())
            && self.case_issues.as_ref().is_none_or(|c| !c.is_empty())
    }
}

/// Normalize a directory name into its identity key.
#[must_use]
pub fn clean_name(name: &str) -> String {
    name.to_lowercase()
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}
