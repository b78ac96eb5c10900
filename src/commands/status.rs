use crate::RservContext;
use crate::content::{CheckKind, ContentEntry, ScanLevel, SyncStatus};
use crate::output::{self, banner};
use crate::utils::format_age;
use anyhow::Result;
use chrono::Utc;

/// Run a full scan of the selected content and print the status table.
///
/// # Errors
///
/// Returns an error if the content directory cannot be read, no requested
/// name resolves, or the cache cannot be written.
pub fn execute(ctx: &RservContext, names: &[String]) -> Result<()> {
    let entries = super::with_repository(ctx, names, |repo, filter| {
        let mut entries = Vec::new();
        repo.scan(&ctx.scan_context(), ScanLevel::Full, filter, |entry| {
            entries.push(entry.clone());
        })?;
        Ok(entries)
    })?;

    output::report(render_status(&entries));

    let now = Utc::now();
    for entry in &entries {
        if let Some(checked) = entry.timestamps.get(&CheckKind::Update) {
            output::verbose(&format!(
                "{} status checked {}",
                entry.nice_name,
                format_age(*checked, now)
            ));
        }
        for link in entry.link_issues().unwrap_or_default() {
            output::verbose(&format!("{}: dangling link {}", entry.nice_name, link.display()));
        }
        for issue in entry.case_issues().unwrap_or_default() {
            output::verbose(&format!(
                "{}: {} has no {} alias",
                entry.nice_name,
                issue.actual.display(),
                issue.alias.display()
            ));
        }
    }

    Ok(())
}

/// Lines of the `#`-framed status table.
///
/// One row per entry with its update badge and issue badge, followed by a
/// message for every unknown status and every kind of recorded issue.
#[must_use]
pub fn render_status(entries: &[ContentEntry]) -> Vec<String> {
    let mut lines = vec![
        banner("Content"),
        "#".to_string(),
        "# Name:            Update:  Status:".to_string(),
        "#".to_string(),
    ];
    let mut messages = Vec::new();

    for entry in entries {
        let issues = if entry.has_issues() { "[!!]" } else { "[OK]" };
        lines.push(format!(
            "# {:<16.16} {:<7.7}  {:<7.7}",
            entry.nice_name,
            entry.status.badge(),
            issues
        ));

        if let SyncStatus::Unknown { message, .. } = &entry.status {
            messages.push(format!("{} {message}", entry.nice_name));
        }
        if entry.link_issues().is_some() {
            messages.push(format!("{} has link issues", entry.nice_name));
        }
        if entry.case_issues().is_some() {
            messages.push(format!("{} has case issues", entry.nice_name));
        }
    }

    lines.push("#".to_string());
    if !messages.is_empty() {
        lines.extend(messages.iter().map(|msg| format!("# !! {msg} !!")));
        lines.push("#".to_string());
    }
    lines
}
