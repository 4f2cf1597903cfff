//! Diagnostic logging.
//!
//! Installs a `tracing` subscriber writing to stderr. The filter is read from
//! `HASHCHECK_LOG` (same syntax as `RUST_LOG`); without it the level is
//! `warn`, `error` for `--quiet` and `debug` for `--verbose`.

use crate::output::Verbosity;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "HASHCHECK_LOG";

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let filter = build_env_filter(verbosity);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

const fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Verbose => "debug",
        Verbosity::Normal => "warn",
        Verbosity::Quiet => "error",
    }
}
