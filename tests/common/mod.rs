#![allow(dead_code)]

use rserv::process::{CommandOutput, ProcessError, ProcessRunner};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Process runner answering from a fixed script, matched by command-line prefix.
///
/// Unmatched commands fail as if the program were not installed.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, CommandOutput)>,
    calls: RefCell<Vec<(String, PathBuf)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.rules.push((prefix.to_string(), output));
        self
    }

    /// A clean Git checkout whose branch matches its upstream.
    pub fn git_up_to_date() -> Self {
        Self::new()
            .on("git remote update", CommandOutput::new("", 0))
            .on(
                "git status",
                CommandOutput::new("# branch.head main\n# branch.upstream origin/main\n# branch.ab +0 -0\n", 0),
            )
    }

    /// Command lines run so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(line, _)| line.clone()).collect()
    }

    /// Working directories of the calls so far.
    pub fn call_dirs(&self) -> Vec<PathBuf> {
        self.calls.borrow().iter().map(|(_, dir)| dir.clone()).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, ProcessError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push((line.clone(), cwd.to_path_buf()));

        self.rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| ProcessError::NotFound {
                program: program.to_string(),
            })
    }
}

/// Temporary content root fixture for consistent test setup
pub struct ContentTree {
    pub temp_dir: TempDir,
}

impl ContentTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, "").unwrap();
        path
    }

    /// Symlink at `relative` pointing to `target` (as given, unresolved).
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, relative: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        std::os::unix::fs::symlink(target, &path).unwrap();
        path
    }

    pub fn remove_dir(&self, relative: &str) {
        fs::remove_dir_all(self.temp_dir.path().join(relative)).unwrap();
    }
}
