//! # Logging Initialization
//!
//! Initializes `tracing-subscriber` once at the CLI entry point. Honors a
//! `DEBUG` environment variable that enables verbose subprocess/HTTP
//! logging, in addition to the `--log-level` flag and `RUST_LOG`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init(log_level: &str, json: bool) {
    let debug_requested = std::env::var("DEBUG").is_ok_and(|v| v != "0" && !v.is_empty());
    let default_directive = if debug_requested { "debug" } else { log_level };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = fmt().with_env_filter(filter).with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Whether ANSI color output should be suppressed, per the `NO_COLOR`
/// convention.
pub fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
