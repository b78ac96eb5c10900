//! Content repository: discovery, scan levels and cached per-directory state.
//!
//! A [`ContentRepository`] owns one [`ContentEntry`] per subdirectory of its
//! root. Scans come in escalating levels:
//!
//! - [`ScanLevel::None`] lists cached entries without touching the disk.
//! - [`ScanLevel::Quick`] discovers directories once per session.
//! - [`ScanLevel::Full`] additionally probes VCS status and integrity.
//! - [`ScanLevel::Rescan`] is a one-shot trigger that forces rediscovery.
//!
//! A level is only re-run when it is stricter than what the repository has
//! already reached. Within a thorough pass, the VCS probe and the integrity
//! scan each have their own staleness timer, so cached answers younger than
//! the update interval are reused across runs.

/// Per-directory records.
pub mod entry;

/// Folding a persisted snapshot into a fresh repository.
pub mod merge;

pub use entry::{CaseIssue, CheckKind, ContentEntry, SyncStatus, clean_name};
pub use merge::merge;

use crate::process::ProcessRunner;
use crate::scanner::{self, RepairReport};
use crate::vcs::{self, PullOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{Level, debug, info, span, warn};

/// How much work a scan performs, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ScanLevel {
    /// Read-only listing of cached entries.
    #[default]
    None,
    /// Directory discovery only.
    Quick,
    /// Discovery plus VCS and integrity probes.
    Full,
    /// Forced rediscovery; recorded as `Full` once done.
    Rescan,
}

impl ScanLevel {
    /// The level a repository records after completing a scan at `self`.
    #[must_use]
    pub const fn recorded(self) -> Self {
        match self {
            Self::Rescan => Self::Full,
            other => other,
        }
    }
}

/// Resolved command-line switches consumed by the scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Ignore every staleness timer.
    pub force: bool,
    /// Report filesystem and VCS changes instead of making them.
    pub pretend: bool,
    /// Emit per-entry diagnostics.
    pub verbose: bool,
}

/// Everything a scan needs besides the repository itself.
#[derive(Clone, Copy)]
pub struct ScanContext<'a> {
    /// Switches for this invocation.
    pub options: ScanOptions,
    /// Executes VCS commands.
    pub runner: &'a dyn ProcessRunner,
    /// Age after which a cached check is re-run.
    pub update_interval: Duration,
}

impl<'a> ScanContext<'a> {
    /// Context with the default update interval.
    #[must_use]
    pub const fn new(runner: &'a dyn ProcessRunner, options: ScanOptions) -> Self {
        Self {
            options,
            runner,
            update_interval: crate::UPDATE_INTERVAL,
        }
    }

    /// Override the staleness interval.
    #[must_use]
    pub const fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Whether `kind` should be re-run for `entry`.
    fn is_due(&self, entry: &ContentEntry, kind: CheckKind, now: DateTime<Utc>) -> bool {
        self.options.force || entry.is_stale(kind, now, self.update_interval)
    }
}

/// Restricts a scan to a set of entries by clean name. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Normalized names to include.
    names: BTreeSet<String>,
}

impl ContentFilter {
    /// A filter that matches every entry.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the filter matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `clean_name` is selected.
    #[must_use]
    pub fn matches(&self, clean_name: &str) -> bool {
        self.names.is_empty() || self.names.contains(clean_name)
    }

    /// Add a raw name, normalizing it.
    pub fn insert(&mut self, name: &str) {
        self.names.insert(clean_name(name));
    }

    /// Selected clean names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ContentFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut filter = Self::default();
        for name in iter {
            filter.insert(name.as_ref());
        }
        filter
    }
}

impl From<&ContentEntry> for ContentFilter {
    fn from(entry: &ContentEntry) -> Self {
        std::iter::once(entry.clean_name.as_str()).collect()
    }
}

/// Conditions that stop a scan before it starts.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content root does not exist.
    #[error("content directory {} does not exist", .0.display())]
    RootMissing(PathBuf),

    /// The content root exists but is not a directory.
    #[error("content path {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    /// The content root could not be listed.
    #[error("failed to read content directory {}: {source}", path.display())]
    Unreadable {
        /// Content root.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Result of [`ContentRepository::update`] for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Display name of the entry.
    pub name: String,
    /// What happened.
    pub pull: PullOutcome,
}

/// Result of [`ContentRepository::rescue_issues`] for one entry.
#[derive(Debug)]
pub struct RescueOutcome {
    /// Display name of the entry.
    pub name: String,
    /// Absolute path of the entry.
    pub path: PathBuf,
    /// Item-level repair results.
    pub report: RepairReport,
}

/// The set of content directories below one root, with cached scan state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRepository {
    /// Directory holding the content entries.
    root_path: PathBuf,
    /// Entries keyed by clean name.
    entries: BTreeMap<String, ContentEntry>,
    /// Strictest level reached so far.
    scan_level: ScanLevel,
    /// When a scan above `Quick` last completed.
    scan_time: Option<DateTime<Utc>>,
}

impl ContentRepository {
    /// An empty repository rooted at `root_path`. Nothing is read yet.
    #[must_use]
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            entries: BTreeMap::new(),
            scan_level: ScanLevel::None,
            scan_time: None,
        }
    }

    /// Reassemble a repository from persisted parts.
    pub(crate) fn from_parts(
        root_path: PathBuf,
        entries: impl IntoIterator<Item = ContentEntry>,
        scan_level: ScanLevel,
        scan_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            root_path,
            entries: entries
                .into_iter()
                .map(|e| (e.clean_name.clone(), e))
                .collect(),
            scan_level: scan_level.recorded(),
            scan_time,
        }
    }

    /// Directory holding the content entries.
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Strictest level reached so far.
    #[must_use]
    pub const fn scan_level(&self) -> ScanLevel {
        self.scan_level
    }

    /// When a scan above `Quick` last completed.
    #[must_use]
    pub const fn scan_time(&self) -> Option<DateTime<Utc>> {
        self.scan_time
    }

    /// Cached entry by name (any case).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContentEntry> {
        self.entries.get(&clean_name(name))
    }

    /// Cached entries in clean-name order.
    pub fn entries(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.values()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy scan bookkeeping from another repository.
    pub(crate) fn adopt_scan_state(&mut self, other: &Self) {
        self.scan_level = self.scan_level.max(other.scan_level.recorded());
        self.scan_time = other.scan_time;
    }

    /// Scan at `level`, calling `visit` for every selected entry.
    ///
    /// `visit` may modify the entry; changes are stored, except at
    /// [`ScanLevel::None`] where it only sees a copy. A `Full` request turns
    /// into a `Rescan` when `force` is set or the last thorough scan is older
    /// than the update interval.
    ///
    /// # Errors
    ///
    /// Returns an error if rediscovery is needed and the root cannot be listed.
    pub fn scan<F>(
        &mut self,
        ctx: &ScanContext<'_>,
        level: ScanLevel,
        filter: &ContentFilter,
        mut visit: F,
    ) -> Result<(), ContentError>
    where
        F: FnMut(&mut ContentEntry),
    {
        let now = Utc::now();
        let level = self.effective_level(ctx, level, now);
        let span = span!(Level::DEBUG, "scan", root = %self.root_path.display(), ?level);
        let _guard = span.enter();
        debug!(from = ?self.scan_level, to = ?level, "Scan requested");

        if level == ScanLevel::None {
            for entry in self.entries.values().filter(|e| filter.matches(&e.clean_name)) {
                let mut view = entry.clone();
                visit(&mut view);
            }
            return Ok(());
        }

        if level > self.scan_level {
            self.discover(ctx, level, filter, &mut visit, now)?;
        } else {
            for entry in self
                .entries
                .values_mut()
                .filter(|e| filter.matches(&e.clean_name))
            {
                visit(entry);
            }
        }

        self.scan_level = self.scan_level.max(level.recorded());
        if level > ScanLevel::Quick {
            self.scan_time = Some(now);
        }
        Ok(())
    }

    /// Visit every entry after at least a quick scan.
    ///
    /// # Errors
    ///
    /// Same as [`ContentRepository::scan`].
    pub fn each<F>(&mut self, ctx: &ScanContext<'_>, visit: F) -> Result<(), ContentError>
    where
        F: FnMut(&mut ContentEntry),
    {
        self.scan(ctx, ScanLevel::Quick, &ContentFilter::all(), visit)
    }

    /// Pull upstream changes for out-of-date entries (every entry with `force`).
    ///
    /// # Errors
    ///
    /// Same as [`ContentRepository::scan`].
    pub fn update(
        &mut self,
        ctx: &ScanContext<'_>,
        filter: &ContentFilter,
    ) -> Result<Vec<UpdateOutcome>, ContentError> {
        let mut outcomes = Vec::new();
        let now = Utc::now();

        self.scan(ctx, ScanLevel::Quick, filter, |entry| {
            if entry.status != SyncStatus::OutOfDate && !ctx.options.force {
                return;
            }

            info!(entry = %entry.nice_name, "Updating content");
            let pull = vcs::pull(ctx.runner, &entry.path, ctx.options.pretend);
            if let Some(status) = pull.resulting_status() {
                if status == SyncStatus::UpToDate {
                    entry.touch(CheckKind::Update, now);
                }
                entry.status = status;
            }

            outcomes.push(UpdateOutcome {
                name: entry.nice_name.clone(),
                pull,
            });
        })?;

        Ok(outcomes)
    }

    /// Repair recorded integrity problems of the selected entries.
    ///
    /// Runs a `Full` scan first so issue lists are current. Items that could
    /// not be repaired stay recorded on the entry. In pretend mode the lists
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`ContentRepository::scan`].
    pub fn rescue_issues(
        &mut self,
        ctx: &ScanContext<'_>,
        filter: &ContentFilter,
    ) -> Result<Vec<RescueOutcome>, ContentError> {
        let mut outcomes = Vec::new();

        self.scan(ctx, ScanLevel::Full, filter, |entry| {
            if !entry.has_issues() {
                return;
            }

            info!(entry = %entry.nice_name, "Rescuing content");
            let report = scanner::repair(
                &entry.path,
                entry.link_issues().unwrap_or_default(),
                entry.case_issues().unwrap_or_default(),
                ctx.options.pretend,
            );

            if !report.pretend {
                entry.set_link_issues(report.remaining_links.clone());
                entry.set_case_issues(report.remaining_case.clone());
            }

            outcomes.push(RescueOutcome {
                name: entry.nice_name.clone(),
                path: entry.path.clone(),
                report,
            });
        })?;

        Ok(outcomes)
    }

    /// Promote `Full` to `Rescan` when forced or when the last thorough scan is stale.
    fn effective_level(&self, ctx: &ScanContext<'_>, level: ScanLevel, now: DateTime<Utc>) -> ScanLevel {
        if level != ScanLevel::Full {
            return level;
        }

        let stale = self.scan_time.is_none_or(|t| {
            now.signed_duration_since(t)
                .to_std()
                .is_ok_and(|elapsed| elapsed > ctx.update_interval)
        });

        if ctx.options.force || stale {
            ScanLevel::Rescan
        } else {
            level
        }
    }

    /// List the root and rebuild the entry map from what is on disk.
    fn discover<F>(
        &mut self,
        ctx: &ScanContext<'_>,
        level: ScanLevel,
        filter: &ContentFilter,
        visit: &mut F,
        now: DateTime<Utc>,
    ) -> Result<(), ContentError>
    where
        F: FnMut(&mut ContentEntry),
    {
        let names = list_content_dirs(&self.root_path)?;
        let mut present = BTreeSet::new();

        for nice_name in names {
            let key = clean_name(&nice_name);
            if !present.insert(key.clone()) {
                warn!(name = %nice_name, "Another directory already uses this name ignoring case, skipping");
                continue;
            }
            if !filter.matches(&key) {
                continue;
            }

            let mut entry = match self.entries.remove(&key) {
                Some(mut cached) => {
                    cached.path = self.root_path.join(&nice_name);
                    cached.nice_name = nice_name;
                    cached
                }
                None => ContentEntry::new(&self.root_path, &nice_name),
            };

            debug!(entry = %entry.nice_name, "Scanning entry");

            if level > ScanLevel::Quick {
                thorough_scan(ctx, &mut entry, now);
            }

            visit(&mut entry);
            self.entries.insert(key, entry);
        }

        let before = self.entries.len();
        self.entries.retain(|key, _| present.contains(key));
        if self.entries.len() != before {
            debug!(dropped = before - self.entries.len(), "Dropped vanished entries");
        }

        Ok(())
    }
}

/// Re-run whichever of the VCS probe and the integrity scan are due.
fn thorough_scan(ctx: &ScanContext<'_>, entry: &mut ContentEntry, now: DateTime<Utc>) {
    if ctx.is_due(entry, CheckKind::Update, now) {
        entry.status = vcs::probe_status(ctx.runner, &entry.path);
        entry.touch(CheckKind::Update, now);
        debug!(entry = %entry.nice_name, status = %entry.status, "Probed VCS status");
    } else {
        debug!(entry = %entry.nice_name, "VCS status is recent, skipping");
    }

    if ctx.is_due(entry, CheckKind::Issues, now) {
        entry.set_link_issues(scanner::find_dangling_links(&entry.path));
        entry.set_case_issues(scanner::find_case_collisions(&entry.path));
        entry.touch(CheckKind::Issues, now);
        debug!(entry = %entry.nice_name, issues = entry.has_issues(), "Scanned for issues");
    } else {
        debug!(entry = %entry.nice_name, "Issue scan is recent, skipping");
    }
}

/// Names of the visible subdirectories of `root`, sorted ignoring case.
///
/// Symlinks to directories count as directories. Entries that vanish while
/// listing are skipped.
fn list_content_dirs(root: &Path) -> Result<Vec<String>, ContentError> {
    let metadata = fs::metadata(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ContentError::RootMissing(root.to_path_buf())
        } else {
            ContentError::Unreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(ContentError::RootNotDirectory(root.to_path_buf()));
    }

    let listing = fs::read_dir(root).map_err(|source| ContentError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = listing
        .filter_map(Result::ok)
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                warn!(name = ?raw, "Skipping content directory with a non UTF-8 name");
                None
            }
        })
        .filter(|name| !name.starts_with('.'))
        .filter(|name| root.join(name).is_dir())
        .collect();

    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CommandOutput;
    use crate::test_utils::fixtures::{ContentTree, ScriptedRunner};
    use chrono::TimeDelta;

    fn collect(repo: &mut ContentRepository, ctx: &ScanContext<'_>, level: ScanLevel) -> Vec<String> {
        let mut seen = Vec::new();
        repo.scan(ctx, level, &ContentFilter::all(), |e| seen.push(e.nice_name.clone()))
            .unwrap();
        seen
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(ScanLevel::None < ScanLevel::Quick);
        assert!(ScanLevel::Quick < ScanLevel::Full);
        assert!(ScanLevel::Full < ScanLevel::Rescan);
        assert_eq!(ScanLevel::Rescan.recorded(), ScanLevel::Full);
    }

    #[test]
    fn test_quick_scan_discovers_sorted_visible_directories() {
        let tree = ContentTree::new();
        tree.dir("zeta");
        tree.dir("Alpha");
        tree.dir("beta");
        tree.dir(".hidden");
        tree.file("notes.txt");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());

        let seen = collect(&mut repo, &ctx, ScanLevel::Quick);

        assert_eq!(seen, vec!["Alpha", "beta", "zeta"]);
        assert_eq!(repo.scan_level(), ScanLevel::Quick);
        assert_eq!(repo.scan_time(), None);
        assert!(runner.calls().is_empty());
        assert_eq!(
            repo.get("ALPHA").unwrap().status,
            SyncStatus::unchecked()
        );
    }

    #[test]
    fn test_none_scan_is_read_only() {
        let tree = ContentTree::new();
        tree.dir("Alpha");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Quick);
        let before = repo.clone();

        tree.dir("Later");
        repo.scan(&ctx, ScanLevel::None, &ContentFilter::all(), |e| {
            e.status = SyncStatus::OutOfDate;
        })
        .unwrap();

        assert_eq!(repo, before);
    }

    #[test]
    fn test_full_scan_promotes_and_records_full() {
        let tree = ContentTree::new();
        tree.dir("plain");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());

        collect(&mut repo, &ctx, ScanLevel::Full);

        assert_eq!(repo.scan_level(), ScanLevel::Full);
        assert!(repo.scan_time().is_some());
        let entry = repo.get("plain").unwrap();
        assert_eq!(
            entry.status,
            SyncStatus::unknown("??", "has no source control information")
        );
        assert!(entry.timestamps.contains_key(&CheckKind::Update));
        assert!(entry.timestamps.contains_key(&CheckKind::Issues));
    }

    #[test]
    fn test_repeated_full_scan_is_idempotent() {
        let tree = ContentTree::new();
        tree.dir("Addon");
        tree.file("Addon/Init.lua");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());

        collect(&mut repo, &ctx, ScanLevel::Full);
        let first: Vec<ContentEntry> = repo.entries().cloned().collect();
        collect(&mut repo, &ctx, ScanLevel::Full);
        let second: Vec<ContentEntry> = repo.entries().cloned().collect();

        assert_eq!(first, second);
        assert!(first[0].has_issues());
    }

    #[test]
    fn test_force_promotes_full_to_rescan() {
        let tree = ContentTree::new();
        tree.dir("one");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Full);

        tree.dir("two");
        assert_eq!(collect(&mut repo, &ctx, ScanLevel::Full), vec!["one"]);

        let forced = ScanContext::new(
            &runner,
            ScanOptions {
                force: true,
                ..ScanOptions::default()
            },
        );
        assert_eq!(collect(&mut repo, &forced, ScanLevel::Full), vec!["one", "two"]);
        assert_eq!(repo.scan_level(), ScanLevel::Full);
    }

    #[test]
    fn test_stale_scan_time_triggers_rescan() {
        let tree = ContentTree::new();
        tree.dir("one");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default())
            .with_update_interval(Duration::from_secs(60));
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Full);

        repo.scan_time = Some(Utc::now() - TimeDelta::minutes(5));
        tree.dir("two");

        assert_eq!(collect(&mut repo, &ctx, ScanLevel::Full), vec!["one", "two"]);
    }

    #[test]
    fn test_rescan_drops_vanished_entries() {
        let tree = ContentTree::new();
        tree.dir("keep");
        tree.dir("gone");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Full);
        assert_eq!(repo.len(), 2);

        tree.remove_dir("gone");
        repo.scan(&ctx, ScanLevel::Rescan, &ContentFilter::all(), |_| {})
            .unwrap();

        assert_eq!(repo.len(), 1);
        assert!(repo.get("keep").is_some());
        assert_eq!(repo.scan_level(), ScanLevel::Full);
    }

    #[test]
    fn test_filter_limits_visits() {
        let tree = ContentTree::new();
        tree.dir("Alpha");
        tree.dir("Beta");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Quick);

        let filter: ContentFilter = ["BETA"].into_iter().collect();
        let mut seen = Vec::new();
        repo.scan(&ctx, ScanLevel::Quick, &filter, |e| seen.push(e.clean_name.clone()))
            .unwrap();

        assert_eq!(seen, vec!["beta"]);
        let single = ContentFilter::from(repo.get("alpha").unwrap());
        assert_eq!(single.names().collect::<Vec<_>>(), vec!["alpha"]);
    }

    #[test]
    fn test_issue_and_update_timers_are_independent() {
        let tree = ContentTree::new();
        tree.dir("mod");
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        collect(&mut repo, &ctx, ScanLevel::Full);

        let recent = Utc::now() - TimeDelta::minutes(1);
        let old = Utc::now() - TimeDelta::hours(3);
        repo.entries.get_mut("mod").unwrap().touch(CheckKind::Update, recent);
        repo.entries.get_mut("mod").unwrap().touch(CheckKind::Issues, old);
        repo.entries.get_mut("mod").unwrap().status = SyncStatus::OutOfDate;
        tree.file("mod/Broken.txt");

        repo.scan(&ctx, ScanLevel::Rescan, &ContentFilter::all(), |_| {})
            .unwrap();

        let entry = repo.get("mod").unwrap();
        assert_eq!(entry.status, SyncStatus::OutOfDate);
        assert_eq!(entry.timestamps[&CheckKind::Update], recent);
        assert!(entry.has_issues());
        assert!(entry.timestamps[&CheckKind::Issues] > old);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let tree = ContentTree::new();
        let runner = ScriptedRunner::new();
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root().join("absent"));

        let err = repo
            .scan(&ctx, ScanLevel::Quick, &ContentFilter::all(), |_| {})
            .unwrap_err();

        assert!(matches!(err, ContentError::RootMissing(_)));
        assert_eq!(repo.scan_level(), ScanLevel::None);
    }

    #[test]
    fn test_update_only_touches_out_of_date_entries() {
        let tree = ContentTree::new();
        tree.dir("behind");
        tree.dir("behind/.git");
        tree.dir("current");
        let runner = ScriptedRunner::new()
            .on("git rev-parse", CommandOutput::new("origin/main\n", 0))
            .on("git pull", CommandOutput::new("", 0));
        let ctx = ScanContext::new(&runner, ScanOptions::default());
        let mut repo = ContentRepository::new(tree.root());
        repo.each(&ctx, |e| {
            e.status = if e.clean_name == "behind" {
                SyncStatus::OutOfDate
            } else {
                SyncStatus::UpToDate
            };
        })
        .unwrap();

        let outcomes = repo.update(&ctx, &ContentFilter::all()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].name, "behind");
        assert_eq!(repo.get("behind").unwrap().status, SyncStatus::UpToDate);
        assert_eq!(
            runner.calls(),
            vec![
                "git rev-parse --abbrev-ref --symbolic-full-name @{u}".to_string(),
                "git pull origin main".to_string()
            ]
        );
    }
}
