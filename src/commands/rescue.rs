use crate::RservContext;
use crate::content::RescueOutcome;
use crate::output;
use anyhow::{Result, bail};

/// Repair dangling links and missing lowercase aliases in the selected content.
///
/// # Errors
///
/// Returns an error if the content directory cannot be read, no requested
/// name resolves, the cache cannot be written, or any item could not be
/// repaired.
pub fn execute(ctx: &RservContext, names: &[String]) -> Result<()> {
    output::info("... Rescuing content ...");

    let outcomes = super::with_repository(ctx, names, |repo, filter| {
        Ok(repo.rescue_issues(&ctx.scan_context(), filter)?)
    })?;

    if outcomes.is_empty() {
        output::success("No issues found");
        return Ok(());
    }

    let mut failures = 0;
    for outcome in &outcomes {
        failures += report_outcome(outcome);
    }

    if failures > 0 {
        bail!("{failures} item(s) could not be repaired");
    }
    Ok(())
}

/// Print what happened to one entry, returning its failure count.
fn report_outcome(outcome: &RescueOutcome) -> usize {
    let report = &outcome.report;
    let (remove_verb, link_verb) = if report.pretend {
        ("Would remove", "Would link")
    } else {
        ("Removed", "Linked")
    };

    for link in &report.removed_links {
        output::action(
            remove_verb,
            &format!("dangling link {}", outcome.path.join(link).display()),
        );
    }
    for issue in &report.created_aliases {
        output::action(
            link_verb,
            &format!(
                "{} -> {}",
                outcome.path.join(&issue.alias).display(),
                issue.actual.display()
            ),
        );
    }
    for issue in &report.skipped_aliases {
        output::verbose(&format!(
            "{} already exists, skipping",
            outcome.path.join(&issue.alias).display()
        ));
    }
    for error in &report.errors {
        output::error(&format!("{}: {error}", outcome.name));
    }

    if report.is_complete() && !report.pretend {
        output::success(&format!("Rescued {}", outcome.name));
    }
    report.errors.len()
}
