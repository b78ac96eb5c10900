use crate::RservContext;
use crate::content::{ContentFilter, ScanLevel};
use crate::output;
use anyhow::Result;

/// Print the names of all content sources.
///
/// # Errors
///
/// Returns an error if the content directory cannot be read or the cache
/// cannot be written.
pub fn execute(ctx: &RservContext) -> Result<()> {
    let names = super::with_repository(ctx, &[], |repo, _| {
        let mut names = Vec::new();
        repo.scan(&ctx.scan_context(), ScanLevel::Quick, &ContentFilter::all(), |entry| {
            names.push(entry.nice_name.clone());
        })?;
        Ok(names)
    })?;

    if names.is_empty() {
        output::info(&format!(
            "No content found in {}",
            ctx.content_path.display()
        ));
        return Ok(());
    }

    output::report(
        std::iter::once("Available content:".to_string())
            .chain(names.iter().map(|name| format!("* {name}"))),
    );
    Ok(())
}
