use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use rserv::cli::{Cli, Commands, ContentAction};
use rserv::content::ScanOptions;
use rserv::output::{self, Verbosity};
use rserv::{RservContext, commands, logging};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let verbosity = if cli.verbose {
        Verbosity::Verbose
    } else if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };
    output::set_verbosity(verbosity);
    logging::init_subscriber(verbosity);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let options = ScanOptions {
        force: cli.force,
        pretend: cli.pretend,
        verbose: cli.verbose,
    };
    let mut ctx = RservContext::new(cli.config.clone(), options)?;
    if let Some(assume) = cli.assume_override() {
        ctx.assume = assume;
    }

    match cli.command {
        Commands::Status => commands::status::execute(&ctx, &[])?,
        Commands::Content { action } => match action.unwrap_or(ContentAction::List) {
            ContentAction::List => commands::list::execute(&ctx)?,
            ContentAction::Status { names } => commands::status::execute(&ctx, &names)?,
            ContentAction::Update { names } => commands::update::execute(&ctx, &names)?,
            ContentAction::Rescue { names } => commands::rescue::execute(&ctx, &names)?,
        },
        Commands::Completion { .. } => {}
    }

    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
