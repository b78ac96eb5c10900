use super::{ContentError, ContentFilter, ContentRepository, ScanContext, ScanLevel};
use tracing::{debug, warn};

/// Fold a persisted `snapshot` into a repository freshly built for the same root.
///
/// `fresh` is quick-scanned so its entries reflect the directories on disk;
/// every fresh entry that also exists in the snapshot takes over the cached
/// status, issue lists and timestamps. Snapshot entries whose directory has
/// vanished are dropped. The snapshot's scan level and time carry over.
/// A snapshot taken for a different root is ignored. No VCS command runs.
///
/// # Errors
///
/// Returns an error if the root of `fresh` cannot be listed.
pub fn merge(
    mut fresh: ContentRepository,
    snapshot: &ContentRepository,
    ctx: &ScanContext<'_>,
) -> Result<ContentRepository, ContentError> {
    fresh.scan(ctx, ScanLevel::Quick, &ContentFilter::all(), |_| {})?;

    if snapshot.root_path() != fresh.root_path() {
        warn!(
            cached = %snapshot.root_path().display(),
            current = %fresh.root_path().display(),
            "Cache was written for a different content directory, ignoring it"
        );
        return Ok(fresh);
    }

    let mut adopted = 0usize;
    for entry in fresh.entries.values_mut() {
        if let Some(cached) = snapshot.entries.get(&entry.clean_name) {
            entry.adopt_checks(cached);
            adopted += 1;
        }
    }
    fresh.adopt_scan_state(snapshot);

    debug!(
        adopted,
        dropped = snapshot.len().saturating_sub(adopted),
        "Merged cached content state"
    );
    Ok(fresh)
}
