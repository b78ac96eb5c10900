//! Version-control status probing and updating.
//!
//! Supported systems are detected from their metadata directory, checked in
//! this order: `.svn`, `.git`, `.hg`. Subversion and Git checkouts can be
//! probed and updated; Mercurial checkouts are recognized but reported as
//! unsupported. Every failure degrades into [`SyncStatus::Unknown`] so a
//! single broken checkout never aborts a scan.

/// Failure categorization for VCS commands.
pub mod errors;

pub use errors::ProbeFailure;

use crate::content::SyncStatus;
use crate::process::{CommandOutput, ProcessRunner};
use std::path::Path;
use tracing::{Level, debug, span, warn};

/// Version-control system managing a content directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    /// `.svn` metadata present.
    Subversion,
    /// `.git` metadata present.
    Git,
    /// `.hg` metadata present.
    Mercurial,
    /// No recognized metadata.
    Untracked,
}

impl VcsKind {
    /// Detect the VCS managing `path`.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        if path.join(".svn").is_dir() {
            Self::Subversion
        } else if path.join(".git").is_dir() {
            Self::Git
        } else if path.join(".hg").is_dir() {
            Self::Mercurial
        } else {
            Self::Untracked
        }
    }

    /// Short tag used in [`SyncStatus::Unknown`] and status tables.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Subversion => "SVN",
            Self::Git => "GIT",
            Self::Mercurial => "HG",
            Self::Untracked => "??",
        }
    }
}

/// Determine whether the checkout at `path` is behind its upstream.
#[must_use]
pub fn probe_status(runner: &dyn ProcessRunner, path: &Path) -> SyncStatus {
    let kind = VcsKind::detect(path);
    let span = span!(Level::DEBUG, "probe_status", path = %path.display(), vcs = kind.tag());
    let _guard = span.enter();

    let result = match kind {
        VcsKind::Subversion => probe_svn(runner, path),
        VcsKind::Git => probe_git(runner, path),
        VcsKind::Mercurial => {
            return SyncStatus::unknown("HG", "uses mercurial, can't check status");
        }
        VcsKind::Untracked => {
            return SyncStatus::unknown("??", "has no source control information");
        }
    };

    result.unwrap_or_else(|failure| {
        warn!(%failure, "Status probe failed");
        SyncStatus::unknown(kind.tag(), failure.to_string())
    })
}

/// Compare the local and repository-head "Last Changed Rev".
fn probe_svn(runner: &dyn ProcessRunner, path: &Path) -> Result<SyncStatus, ProbeFailure> {
    let local = run_checked(runner, "svn", &["info"], path)?;
    let remote = run_checked(runner, "svn", &["info", "-r", "HEAD"], path)?;

    let missing = || ProbeFailure::Other("svn info: no Last Changed Rev reported".to_string());
    let local_rev = last_changed_rev(&local.stdout).ok_or_else(missing)?;
    let remote_rev = last_changed_rev(&remote.stdout).ok_or_else(missing)?;
    debug!(local_rev, remote_rev, "Compared svn revisions");

    Ok(if local_rev == remote_rev {
        SyncStatus::UpToDate
    } else {
        SyncStatus::OutOfDate
    })
}

/// Fetch every remote, then read the ahead/behind counters of the branch.
fn probe_git(runner: &dyn ProcessRunner, path: &Path) -> Result<SyncStatus, ProbeFailure> {
    run_checked(runner, "git", &["remote", "update"], path)?;
    let status = run_checked(
        runner,
        "git",
        &["status", "-uno", "--porcelain=v2", "--branch"],
        path,
    )?;

    match behind_count(&status.stdout) {
        Some(behind) if behind > 0 => {
            debug!(behind, "Branch is behind upstream");
            Ok(SyncStatus::OutOfDate)
        }
        Some(_) => Ok(SyncStatus::UpToDate),
        None => {
            debug!("Branch has no upstream, treating as up to date");
            Ok(SyncStatus::UpToDate)
        }
    }
}

/// Run a command, turning spawn errors and non-zero exits into a [`ProbeFailure`].
fn run_checked(
    runner: &dyn ProcessRunner,
    program: &str,
    args: &[&str],
    cwd: &Path,
) -> Result<CommandOutput, ProbeFailure> {
    let output = runner
        .run(program, args, cwd)
        .map_err(|e| ProbeFailure::from_process(&e))?;

    if output.success() {
        Ok(output)
    } else {
        Err(ProbeFailure::from_stderr(
            &command_line(program, args),
            &output.stderr,
        ))
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of the `Last Changed Rev:` line of `svn info` output.
#[must_use]
pub fn last_changed_rev(info: &str) -> Option<&str> {
    info.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("last changed rev")
            .then(|| value.trim())
    })
}

/// Commits behind upstream, from `git status --porcelain=v2 --branch`.
///
/// Returns `None` when the branch has no upstream.
#[must_use]
pub fn behind_count(porcelain: &str) -> Option<u64> {
    porcelain.lines().find_map(|line| {
        let counters = line.strip_prefix("# branch.ab ")?;
        counters
            .split_whitespace()
            .find_map(|c| c.strip_prefix('-'))
            .and_then(|n| n.parse().ok())
    })
}

/// Result of pulling upstream changes into a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// The update command succeeded.
    Updated {
        /// Command that ran.
        command: String,
    },
    /// The update command ran and exited unsuccessfully.
    Failed {
        /// Command that ran.
        command: String,
        /// Categorized reason.
        failure: ProbeFailure,
    },
    /// No update could be attempted.
    Unavailable {
        /// Status to record for the entry.
        status: SyncStatus,
    },
    /// Dry run: the command that would have run.
    Planned {
        /// Command that would run.
        command: String,
    },
}

impl PullOutcome {
    /// Status the entry should carry after this outcome, or `None` to leave it.
    #[must_use]
    pub fn resulting_status(&self) -> Option<SyncStatus> {
        match self {
            Self::Updated { .. } => Some(SyncStatus::UpToDate),
            Self::Failed { .. } => Some(SyncStatus::OutOfDate),
            Self::Unavailable { status } => Some(status.clone()),
            Self::Planned { .. } => None,
        }
    }
}

/// Bring the checkout at `path` up to date with its upstream.
///
/// With `pretend`, read-only queries still run but the update itself is
/// only reported.
#[must_use]
pub fn pull(runner: &dyn ProcessRunner, path: &Path, pretend: bool) -> PullOutcome {
    let kind = VcsKind::detect(path);
    let span = span!(Level::DEBUG, "pull", path = %path.display(), vcs = kind.tag());
    let _guard = span.enter();

    match kind {
        VcsKind::Subversion => run_update(runner, kind, path, "svn", &["up"], pretend),
        VcsKind::Git => {
            let upstream = match run_checked(
                runner,
                "git",
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
                path,
            ) {
                Ok(output) => output.stdout.trim().to_string(),
                Err(failure) => {
                    warn!(%failure, "Could not resolve upstream branch");
                    return match failure {
                        ProbeFailure::MissingTool(_) | ProbeFailure::TimedOut(_) => {
                            PullOutcome::Unavailable {
                                status: SyncStatus::unknown(kind.tag(), failure.to_string()),
                            }
                        }
                        _ => PullOutcome::Failed {
                            command: "git pull".to_string(),
                            failure,
                        },
                    };
                }
            };

            let mut args = vec!["pull"];
            if let Some((remote, branch)) = upstream.split_once('/') {
                args.push(remote);
                args.push(branch);
            }
            run_update(runner, kind, path, "git", &args, pretend)
        }
        VcsKind::Mercurial => PullOutcome::Unavailable {
            status: SyncStatus::unknown("HG", "can't check mercurial status"),
        },
        VcsKind::Untracked => PullOutcome::Unavailable {
            status: SyncStatus::unknown("??", "no source control information"),
        },
    }
}

fn run_update(
    runner: &dyn ProcessRunner,
    kind: VcsKind,
    path: &Path,
    program: &str,
    args: &[&str],
    pretend: bool,
) -> PullOutcome {
    let command = command_line(program, args);
    if pretend {
        return PullOutcome::Planned { command };
    }

    match runner.run(program, args, path) {
        Ok(output) if output.success() => PullOutcome::Updated { command },
        Ok(output) => PullOutcome::Failed {
            failure: ProbeFailure::from_stderr(&command, &output.stderr),
            command,
        },
        Err(e) => PullOutcome::Unavailable {
            status: SyncStatus::unknown(kind.tag(), ProbeFailure::from_process(&e).to_string()),
        },
    }
}
