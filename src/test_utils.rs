#[cfg(test)]
pub mod fixtures {
    use crate::process::{CommandOutput, ProcessError, ProcessRunner};
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Process runner that answers from a fixed script and records every call.
    ///
    /// Rules match on a prefix of the full command line (`"git status"` matches
    /// `git status -uno ...`); the first matching rule wins. Unmatched commands
    /// behave as if the program were not installed.
    #[derive(Default)]
    pub struct ScriptedRunner {
        rules: Vec<(String, CommandOutput)>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, prefix: &str, output: CommandOutput) -> Self {
            self.rules.push((prefix.to_string(), output));
            self
        }

        /// Command lines run so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput, ProcessError> {
            let line = std::iter::once(program)
                .chain(args.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            self.calls.borrow_mut().push(line.clone());

            self.rules
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, output)| output.clone())
                .ok_or_else(|| ProcessError::NotFound {
                    program: program.to_string(),
                })
        }
    }

    /// Temporary content root with helpers for shaping it.
    pub struct ContentTree {
        temp_dir: TempDir,
    }

    impl ContentTree {
        pub fn new() -> Self {
            Self {
                temp_dir: TempDir::new().unwrap(),
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

        pub fn remove_dir(&self, relative: &str) {
            fs::remove_dir_all(self.temp_dir.path().join(relative)).unwrap();
        }
    }
}
