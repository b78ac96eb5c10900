//! Release artifacts for rserv: man pages and shell completions.
//!
//! Run with `cargo run -p xtask -- <task>`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask", about = "Release artifacts for rserv")]
enum Task {
    /// Write rserv(1) and rserv-content(1)
    ManPages {
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
    /// Write completion scripts for every supported shell
    Completions {
        #[arg(short, long, default_value = "completions")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    match Task::parse() {
        Task::ManPages { output } => man_pages(&output),
        Task::Completions { output } => completions(&output),
    }
}

fn prepare(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}

fn man_pages(dir: &Path) -> Result<()> {
    prepare(dir)?;
    let cli = rserv::cli::Cli::command();

    // Most of the surface lives under `rserv content`, so it gets its own page
    let content = cli
        .find_subcommand("content")
        .context("CLI has no `content` subcommand")?
        .clone()
        .name("rserv-content");

    for (page, cmd) in [("rserv.1", cli.clone()), ("rserv-content.1", content)] {
        let path = dir.join(page);
        let file = fs::File::create(&path)
            .with_context(|| format!("Failed to create man page: {}", path.display()))?;
        clap_mangen::Man::new(cmd).render(&mut std::io::BufWriter::new(file))?;
        println!("wrote {}", path.display());
    }

    println!("install with: sudo cp {}/*.1 /usr/share/man/man1/", dir.display());
    Ok(())
}

fn completions(dir: &Path) -> Result<()> {
    prepare(dir)?;
    let mut cli = rserv::cli::Cli::command();

    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::Elvish, Shell::PowerShell] {
        let path = clap_complete::generate_to(shell, &mut cli, "rserv", dir)
            .with_context(|| format!("Failed to write {shell} completions"))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
