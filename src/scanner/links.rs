use crate::utils::relative_to;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Find symlinks under `root` whose target no longer exists.
///
/// Links are not followed during the walk, so a link pointing back into the
/// tree cannot cause a loop. Paths are returned relative to `root` in walk
/// order (sorted by file name at each level). Unreadable subdirectories are
/// skipped; a missing `root` yields an empty list.
#[must_use]
pub fn find_dangling_links(root: &Path) -> Vec<PathBuf> {
    let mut dangling = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable path during link scan");
                continue;
            }
        };

        if entry.file_type().is_symlink() && is_dangling(entry.path()) {
            dangling.push(relative_to(entry.path(), root));
        }
    }

    dangling
}

/// Whether `path` is a symlink whose target cannot be resolved.
#[must_use]
pub fn is_dangling(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink()) && fs::metadata(path).is_err()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nested_dangling_links() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("lua/autorun")).unwrap();
        fs::write(root.join("lua/real.lua"), "").unwrap();

        symlink(root.join("lua/real.lua"), root.join("lua/ok.lua")).unwrap();
        symlink(root.join("gone.lua"), root.join("lua/autorun/broken.lua")).unwrap();
        symlink("missing", root.join("top")).unwrap();

        let links = find_dangling_links(root);

        assert_eq!(
            links,
            vec![
                PathBuf::from("lua/autorun/broken.lua"),
                PathBuf::from("top")
            ]
        );
    }

    #[test]
    fn test_link_cycles_do_not_hang() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("a")).unwrap();
        symlink(root, root.join("a/loop")).unwrap();

        assert!(find_dangling_links(root).is_empty());
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(find_dangling_links(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_is_dangling() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        symlink(temp.path().join("target"), &link).unwrap();
        assert!(is_dangling(&link));

        fs::write(temp.path().join("target"), "").unwrap();
        assert!(!is_dangling(&link));
        assert!(!is_dangling(&temp.path().join("target")));
    }
}
