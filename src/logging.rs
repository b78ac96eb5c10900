//! Tracing subscriber setup for the rserv binary.
//!
//! Library code only emits events; the binary decides where they go. The
//! filter is taken from `RSERV_LOG`, then `RUST_LOG`, then the verbosity
//! chosen on the command line.

use crate::output::Verbosity;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the global subscriber, writing to stderr.
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_subscriber(verbosity: Verbosity) {
    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(false)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbosity))
        .with(fmt_layer)
        .try_init();
}

/// Build an `EnvFilter` respecting the priority chain:
/// `RSERV_LOG` > `RUST_LOG` > CLI verbosity default.
fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    if let Ok(directives) = std::env::var("RSERV_LOG")
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(default_directive(verbosity))
}

/// Filter used when no environment override is set.
const fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "warn,rserv=debug",
    }
}
