//! Process execution for VCS probes and updates.
//!
//! Every invocation receives its working directory explicitly; nothing in this
//! crate changes the process-wide current directory. [`SystemRunner`] spawns
//! each command in its own process group and kills the whole group when the
//! configured timeout expires, so a hung `git fetch` cannot stall a scan.

use command_group::CommandGroup;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{Level, debug, span, warn};

/// Interval between exit checks while a child is running.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Output of a command that exited with `code`.
    #[must_use]
    pub fn new(stdout: impl Into<String>, code: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(code),
        }
    }

    /// Attach standard error text.
    #[must_use]
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Failures that prevent a command from producing an exit status.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program is not on `PATH`.
    #[error("{program} is not installed")]
    NotFound {
        /// Program name as requested.
        program: String,
    },

    /// The program exists but could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program name as requested.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The program ran longer than the allowed time and was killed.
    #[error("{program} timed out after {}", humantime::format_duration(*timeout))]
    TimedOut {
        /// Program name as requested.
        program: String,
        /// Limit that was exceeded.
        timeout: Duration,
    },

    /// Waiting on the child failed.
    #[error("lost track of {program}: {source}")]
    Wait {
        /// Program name as requested.
        program: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Runs external commands on behalf of the scanner.
pub trait ProcessRunner {
    /// Run `program` with `args` inside `cwd` and wait for it to finish.
    ///
    /// A non-zero exit status is not an error; it is reported through
    /// [`CommandOutput::exit_code`].
    ///
    /// # Errors
    ///
    /// Returns an error if the program is missing, cannot be spawned, or
    /// exceeds the runner's time limit.
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, ProcessError>;
}

/// Runs commands on the host with a bounded timeout.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    /// Maximum wall-clock time for a single command.
    timeout: Duration,
}

impl SystemRunner {
    /// Create a runner that kills commands after `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured time limit.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve `program` on `PATH`.
    fn locate(program: &str) -> Result<PathBuf, ProcessError> {
        which::which(program).map_err(|_| ProcessError::NotFound {
            program: program.to_string(),
        })
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, ProcessError> {
        let span = span!(Level::DEBUG, "run", program, cwd = %cwd.display());
        let _guard = span.enter();

        let executable = Self::locate(program)?;
        debug!(?args, "Spawning command");

        let mut group = Command::new(&executable)
            .args(args)
            .current_dir(cwd)
            // Keep output parseable and never block on credential prompts
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .group_spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = drain(group.inner().stdout.take());
        let stderr = drain(group.inner().stderr.take());

        let started = Instant::now();
        let status = loop {
            match group.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() < self.timeout => thread::sleep(POLL_INTERVAL),
                Ok(None) => {
                    warn!(timeout = ?self.timeout, "Command timed out, killing process group");
                    if let Err(e) = group.kill() {
                        debug!(error = %e, "Failed to kill timed out process group");
                    }
                    let _ = group.wait();
                    return Err(ProcessError::TimedOut {
                        program: program.to_string(),
                        timeout: self.timeout,
                    });
                }
                Err(source) => {
                    return Err(ProcessError::Wait {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        };

        let output = CommandOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            exit_code: status.code(),
        };
        debug!(exit_code = ?output.exit_code, "Command finished");
        Ok(output)
    }
}

/// Read a child pipe to completion on a helper thread so the child never
/// blocks on a full pipe buffer while we poll for its exit.
fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

/// Join a drain thread and decode what it read.
fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
