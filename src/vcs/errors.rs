use crate::process::ProcessError;
use thiserror::Error;

/// Why a VCS command could not report a usable answer.
///
/// Each variant renders as a phrase that reads after the entry name in
/// status output, e.g. `"wiremod can't reach its remote (...)"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// DNS failure, refused connection, unreachable network.
    #[error("can't reach its remote ({0})")]
    Network(String),
    /// Rejected credentials or missing keys.
    #[error("was refused by its remote ({0})")]
    Authentication(String),
    /// The remote, branch or working copy does not exist.
    #[error("points at something that does not exist ({0})")]
    NotFound(String),
    /// Local filesystem permissions.
    #[error("can't be accessed ({0})")]
    Permission(String),
    /// The VCS binary is not installed.
    #[error("can't be checked, {0} is not installed")]
    MissingTool(String),
    /// The command exceeded its time limit.
    #[error("timed out while checking ({0})")]
    TimedOut(String),
    /// Anything else.
    #[error("failed to check status ({0})")]
    Other(String),
}

impl ProbeFailure {
    /// Categorize a failed command from its stderr text.
    #[must_use]
    pub fn from_stderr(command: &str, stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        let detail = format!("{command}: {}", extract_meaningful_message(stderr));

        if lower.contains("could not resolve host")
            || lower.contains("connection timed out")
            || lower.contains("network is unreachable")
            || lower.contains("failed to connect")
            || lower.contains("connection refused")
            || lower.contains("unable to connect")
        {
            return Self::Network(detail);
        }

        if lower.contains("authentication failed")
            || lower.contains("authorization failed")
            || lower.contains("publickey")
            || lower.contains("access denied")
            || lower.contains("could not read username")
        {
            return Self::Authentication(detail);
        }

        if lower.contains("permission denied") || lower.contains("read-only") {
            return Self::Permission(detail);
        }

        if lower.contains("does not exist")
            || lower.contains("not found")
            || lower.contains("not a working copy")
            || lower.contains("not a git repository")
            || lower.contains("no upstream")
            || lower.contains("no such")
        {
            return Self::NotFound(detail);
        }

        Self::Other(detail)
    }

    /// Map a process-level failure onto a probe failure.
    #[must_use]
    pub fn from_process(err: &ProcessError) -> Self {
        match err {
            ProcessError::NotFound { program } => Self::MissingTool(program.clone()),
            ProcessError::TimedOut { .. } => Self::TimedOut(err.to_string()),
            ProcessError::Spawn { .. } | ProcessError::Wait { .. } => Self::Other(err.to_string()),
        }
    }
}

/// First few non-empty stderr lines joined into one line.
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(2)
        .collect();

    if lines.is_empty() {
        return "no error details available".to_string();
    }

    lines.join(" | ")
}
