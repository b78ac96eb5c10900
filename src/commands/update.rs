use crate::RservContext;
use crate::content::UpdateOutcome;
use crate::output;
use crate::vcs::PullOutcome;
use anyhow::Result;

/// Pull upstream changes into out-of-date content (all selected content with `--force`).
///
/// # Errors
///
/// Returns an error if the content directory cannot be read, no requested
/// name resolves, or the cache cannot be written. Failed pulls are reported,
/// not returned as errors.
pub fn execute(ctx: &RservContext, names: &[String]) -> Result<()> {
    output::info("... Updating content ...");

    let outcomes = super::with_repository(ctx, names, |repo, filter| {
        Ok(repo.update(&ctx.scan_context(), filter)?)
    })?;

    if outcomes.is_empty() {
        output::info("Nothing to update");
        return Ok(());
    }

    for outcome in &outcomes {
        report_outcome(outcome);
    }
    Ok(())
}

fn report_outcome(outcome: &UpdateOutcome) {
    let name = &outcome.name;
    match &outcome.pull {
        PullOutcome::Updated { command } => {
            output::success(&format!("Updated {name}"));
            output::verbose(&format!("  ran `{command}`"));
        }
        PullOutcome::Failed { command, failure } => {
            output::warning(&format!("{name} {failure} (`{command}` failed)"));
        }
        PullOutcome::Unavailable { status } => {
            output::warning(&format!("{name} {status}"));
        }
        PullOutcome::Planned { command } => {
            output::action("Would run", &format!("`{command}` in {name}"));
        }
    }
}
