use super::links::is_dangling;
use crate::content::CaseIssue;
use crate::utils::relative_to;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find files and directories under `root` that have no lowercase alias.
///
/// A name counts as a collision hazard when its lowercase form differs from
/// the name itself and nothing with the lowercase name exists next to it.
/// Hidden entries (leading `.`) are skipped entirely, as are dangling links,
/// which the link scan already reports. Directory symlinks are followed;
/// cycles are cut by remembering canonical directory paths.
#[must_use]
pub fn find_case_collisions(root: &Path) -> Vec<CaseIssue> {
    let mut visited = HashSet::new();
    walk(root, root, &mut visited)
}

/// Depth-first walk of `dir`, returning collisions relative to `root`.
///
/// `visited` holds canonical paths of directories already walked.
pub fn walk(dir: &Path, root: &Path, visited: &mut HashSet<PathBuf>) -> Vec<CaseIssue> {
    let mut problems = Vec::new();

    if dir != root && is_hidden(dir) {
        return problems;
    }

    match fs::canonicalize(dir) {
        Ok(canonical) => {
            if !visited.insert(canonical) {
                return problems;
            }
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unresolvable directory");
            return problems;
        }
    }

    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect(),
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return problems;
        }
    };
    names.sort();

    for name in names {
        let actual = dir.join(&name);
        if is_dangling(&actual) {
            continue;
        }

        let lower = name.to_lowercase();

        if lower != name {
            let alias = dir.join(&lower);
            if fs::symlink_metadata(&alias).is_err() {
                problems.push(CaseIssue::new(
                    relative_to(&actual, root),
                    relative_to(&alias, root),
                ));
            }
        }

        if actual.is_dir() {
            problems.extend(walk(&actual, root, visited));
        }
    }

    problems
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
