use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated home with a config file pointing at a private content root.
struct Sandbox {
    home: TempDir,
    content: PathBuf,
    cache: PathBuf,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Result<Self> {
        let home = TempDir::new()?;
        let content = home.path().join("content");
        let cache = home.path().join("state/cache.bin");
        let config = home.path().join("rserv.toml");
        fs::create_dir_all(&content)?;
        fs::write(
            &config,
            format!(
                "[core]\ncontent_path = '{}'\ncache_path = '{}'\n\n[names]\nassume = false\n",
                content.display(),
                cache.display()
            ),
        )?;

        Ok(Self {
            home,
            content,
            cache,
            config,
        })
    }

    fn dir(&self, relative: &str) -> Result<()> {
        fs::create_dir_all(self.content.join(relative))?;
        Ok(())
    }

    fn file(&self, relative: &str) -> Result<()> {
        let path = self.content.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "")?;
        Ok(())
    }

    fn rserv(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("rserv")?;
        cmd.env("HOME", self.home.path())
            .env("RSERV_CONFIG_PATH", &self.config)
            .env("NO_COLOR", "1")
            .env_remove("RSERV_CONTENT_PATH")
            .env_remove("RSERV_LOG");
        Ok(cmd)
    }
}

#[test]
fn test_content_lists_directories() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Wire")?;
    sandbox.dir("ulx")?;
    sandbox.file("notes.txt")?;
    sandbox.dir(".hidden")?;

    sandbox
        .rserv()?
        .arg("content")
        .assert()
        .success()
        .stdout("Available content:\n* ulx\n* Wire\n");

    assert!(sandbox.cache.exists());
    Ok(())
}

#[test]
fn test_empty_content_directory() -> Result<()> {
    let sandbox = Sandbox::new()?;

    sandbox
        .rserv()?
        .args(["content", "list"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("No content found"));

    Ok(())
}

#[test]
fn test_status_table() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Plain")?;
    sandbox.file("Models/Chair.mdl")?;

    sandbox
        .rserv()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "################ Content #################\n#\n# Name:            Update:  Status:\n#\n",
        ))
        .stdout(predicate::str::contains("# Models           [??]     [!!]   \n"))
        .stdout(predicate::str::contains("# Plain            [??]     [OK]   \n"))
        .stdout(predicate::str::contains(
            "# !! Plain has no source control information !!",
        ))
        .stdout(predicate::str::contains("# !! Models has case issues !!"));

    Ok(())
}

#[test]
fn test_status_of_named_content() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Plain")?;
    sandbox.dir("Other")?;

    sandbox
        .rserv()?
        .args(["content", "status", "PLAIN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Plain "))
        .stdout(predicate::str::contains("# Other ").not());

    Ok(())
}

#[test]
fn test_unknown_name_fails() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Wire")?;

    sandbox
        .rserv()?
        .args(["content", "status", "zzzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find 'zzzz'"))
        .stderr(predicate::str::contains("None of the given names match any content"));

    Ok(())
}

#[test]
fn test_close_name_is_suggested_or_assumed() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Wire")?;

    sandbox
        .rserv()?
        .args(["content", "status", "wre"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find 'wre', did you mean 'Wire'?"));

    sandbox
        .rserv()?
        .args(["content", "status", "wre", "--assume"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not find 'wre', assuming 'Wire'"))
        .stdout(predicate::str::contains("# Wire "));

    Ok(())
}

#[test]
fn test_missing_content_directory() -> Result<()> {
    let sandbox = Sandbox::new()?;

    sandbox
        .rserv()?
        .env("RSERV_CONTENT_PATH", sandbox.home.path().join("nowhere"))
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read content directory"))
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
    let sandbox = Sandbox::new()?;

    sandbox
        .rserv()?
        .args(["--config", "/definitely/not/here.toml", "content"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    Ok(())
}

#[test]
fn test_pretend_rescue_leaves_disk_alone() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.file("Maps/Arena.bsp")?;

    sandbox
        .rserv()?
        .args(["content", "rescue", "-p"])
        .assert()
        .success()
        .stderr(predicate::str::contains("... Rescuing content ..."))
        .stderr(predicate::str::contains("Would link"));

    assert!(fs::symlink_metadata(sandbox.content.join("Maps/arena.bsp")).is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_rescue_creates_aliases() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.file("Maps/Arena.bsp")?;

    sandbox
        .rserv()?
        .args(["content", "rescue"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Rescued Maps"));

    assert!(sandbox.content.join("Maps/arena.bsp").exists());

    // Nothing left to do on the next run
    sandbox
        .rserv()?
        .args(["content", "rescue", "--force"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No issues found"));

    Ok(())
}

#[test]
fn test_update_without_outdated_content() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Plain")?;

    sandbox
        .rserv()?
        .args(["content", "update"])
        .assert()
        .success()
        .stderr(predicate::str::contains("... Updating content ..."))
        .stderr(predicate::str::contains("Nothing to update"));

    Ok(())
}

#[test]
fn test_quiet_hides_informational_messages() -> Result<()> {
    let sandbox = Sandbox::new()?;
    sandbox.dir("Plain")?;

    sandbox
        .rserv()?
        .args(["content", "update", "-q"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Updating").not());

    Ok(())
}

#[test]
fn test_completion_script() -> Result<()> {
    let sandbox = Sandbox::new()?;

    sandbox
        .rserv()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rserv"));

    // Completion never needs a config file
    assert!(!sandbox.home.path().join(".config").exists());
    Ok(())
}
