//! Terminal output for the rserv CLI.
//!
//! Messages about what a command is doing go to stderr, filtered by the
//! global [`Verbosity`]. Reports (content listings, status tables) go to
//! stdout unfiltered, so `rserv status -q` still prints the table.

use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Width of framed report lines.
pub const REPORT_WIDTH: usize = 42;

/// How chatty stderr output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet = 0,
    /// Progress and results.
    Normal = 1,
    /// Per-entry details as well.
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Set the verbosity for the rest of the process.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Current verbosity.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Write `line` to stderr if the current verbosity is at least `min`.
fn emit(min: Verbosity, line: impl FnOnce() -> ColoredString) {
    if get_verbosity() >= min {
        eprintln!("{}", line());
    }
}

/// A step that finished well, e.g. `Updated wiremod`.
pub fn success(message: &str) {
    emit(Verbosity::Normal, || message.green());
}

/// A failure the user must see.
pub fn error(message: &str) {
    emit(Verbosity::Quiet, || message.red().bold());
}

/// Something degraded but the command carries on.
pub fn warning(message: &str) {
    emit(Verbosity::Quiet, || message.yellow().bold());
}

/// Progress such as `... Updating content ...`.
pub fn info(message: &str) {
    emit(Verbosity::Normal, || message.dimmed());
}

/// Details shown only with `--verbose`.
pub fn verbose(message: &str) {
    emit(Verbosity::Verbose, || message.dimmed());
}

/// A filesystem or VCS action, verb in bold: `Linked sound -> Sound`.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() >= Verbosity::Normal {
        eprintln!("{} {message}", verb.bold());
    }
}

/// Print report lines to stdout.
pub fn report<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        println!("{}", line.as_ref());
    }
}

/// `title` centered in a line of `#`, e.g. `###### Content ######`.
///
/// An odd remainder goes to the right-hand side.
#[must_use]
pub fn banner(title: &str) -> String {
    let padded = format!(" {title} ");
    let len = padded.chars().count();
    if len >= REPORT_WIDTH {
        return padded;
    }
    let left = (REPORT_WIDTH - len) / 2;
    let right = REPORT_WIDTH - len - left;
    format!("{}{padded}{}", "#".repeat(left), "#".repeat(right))
}
