pub mod context;
pub mod list;
pub mod rescue;
pub mod resolve;
pub mod status;
pub mod update;

use anyhow::{Context, Result};

use crate::RservContext;
use crate::content::{ContentFilter, ContentRepository};
use context::CommandContext;

/// Run `f` on the cached repository under the cache lock, then save it.
///
/// `names` are resolved into a filter first; an empty list selects all
/// content. The cache is written even when `f` fails, so results gathered
/// before the failure are kept.
///
/// # Errors
///
/// Returns an error if the lock cannot be taken, the content directory
/// cannot be read, no name resolves, `f` fails, or the cache cannot be written.
pub fn with_repository<T, F>(ctx: &RservContext, names: &[String], f: F) -> Result<T>
where
    F: FnOnce(&mut ContentRepository, &ContentFilter) -> Result<T>,
{
    let _lock = ctx.lock_cache()?;
    let mut repo = ctx.open_repository()?;

    repo.each(&ctx.scan_context(), |_| {}).with_context(|| {
        format!(
            "Failed to read content directory {}",
            ctx.content_path.display()
        )
    })?;
    let filter = resolve::resolve_filter(&repo, names, ctx.assume)?;

    let result = f(&mut repo, &filter);
    ctx.persist_repository(&repo)?;
    result
}
