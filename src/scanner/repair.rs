use super::links::is_dangling;
use crate::content::CaseIssue;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, debug, span, warn};

/// A single repair action that failed.
#[derive(Debug, Error)]
pub enum RepairError {
    /// A dangling link could not be deleted.
    #[error("failed to remove dangling link {}: {source}", path.display())]
    RemoveLink {
        /// Link path relative to the content root.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A lowercase alias link could not be created.
    #[error("failed to link {} to {}: {source}", issue.alias.display(), issue.actual.display())]
    CreateAlias {
        /// Collision being repaired.
        issue: CaseIssue,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// What a repair pass did, item by item.
///
/// Items listed in `remaining_links` and `remaining_case` were not repaired
/// and should stay recorded on the entry.
#[derive(Debug, Default)]
pub struct RepairReport {
    /// Whether this was a dry run; action lists then describe intent only.
    pub pretend: bool,
    /// Dangling links removed (or that would be removed).
    pub removed_links: Vec<PathBuf>,
    /// Alias links created (or that would be created).
    pub created_aliases: Vec<CaseIssue>,
    /// Collisions whose alias path already existed.
    pub skipped_aliases: Vec<CaseIssue>,
    /// Links that still need attention.
    pub remaining_links: Vec<PathBuf>,
    /// Collisions that still need attention.
    pub remaining_case: Vec<CaseIssue>,
    /// Per-item failures.
    pub errors: Vec<RepairError>,
}

impl RepairReport {
    /// Whether every item was handled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Repair the recorded problems of the content directory at `root`.
///
/// All dangling links are removed first, then an alias symlink is created
/// for every case collision whose alias path is still free and whose actual
/// name still resolves. Each item is
/// handled independently: a failure is recorded in the report and the pass
/// continues. With `pretend`, nothing on disk changes.
#[must_use]
pub fn repair(root: &Path, links: &[PathBuf], case: &[CaseIssue], pretend: bool) -> RepairReport {
    let span = span!(Level::DEBUG, "repair", root = %root.display(), pretend);
    let _guard = span.enter();

    let mut report = RepairReport {
        pretend,
        ..RepairReport::default()
    };

    for link in links {
        let path = root.join(link);
        if pretend {
            report.removed_links.push(link.clone());
            continue;
        }

        if !needs_removal(&path) {
            debug!(link = %link.display(), "Link no longer dangling, skipping");
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => report.removed_links.push(link.clone()),
            Err(source) => {
                warn!(link = %link.display(), error = %source, "Failed to remove dangling link");
                report.remaining_links.push(link.clone());
                report.errors.push(RepairError::RemoveLink {
                    path: link.clone(),
                    source,
                });
            }
        }
    }

    for issue in case {
        let alias = root.join(&issue.alias);
        // An alias to a vanished name would be a new dangling link
        if fs::symlink_metadata(&alias).is_ok() || fs::metadata(root.join(&issue.actual)).is_err() {
            report.skipped_aliases.push(issue.clone());
            continue;
        }
        if pretend {
            report.created_aliases.push(issue.clone());
            continue;
        }

        match create_alias(root, issue) {
            Ok(()) => report.created_aliases.push(issue.clone()),
            Err(source) => {
                warn!(alias = %issue.alias.display(), error = %source, "Failed to create alias link");
                report.remaining_case.push(issue.clone());
                report.errors.push(RepairError::CreateAlias {
                    issue: issue.clone(),
                    source,
                });
            }
        }
    }

    report
}

/// Whether a recorded link still has to go.
///
/// A link that vanished or whose target came back since the scan is left
/// alone. Anything that cannot be inspected is handed to the removal so the
/// failure gets reported.
fn needs_removal(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(_) => is_dangling(path),
        Err(e) => e.kind() != io::ErrorKind::NotFound,
    }
}

/// Link `issue.alias` to its sibling `issue.actual` with a relative target.
fn create_alias(root: &Path, issue: &CaseIssue) -> io::Result<()> {
    let target = issue
        .actual
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "collision path has no file name"))?;
    symlink(Path::new(target), &root.join(&issue.alias))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
