//! Logging initialization, driven by the `[logging]` config section.
//!
//! Log output goes to stderr; stdout is reserved for the classification
//! result JSON.

use lumen_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Recognized level strings, least to most verbose.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Initialize the logging subsystem.
///
/// The configured level string seeds the filter; `--verbose` raises the
/// floor to `debug` without lowering a `trace` config, and `--json-logs`
/// forces JSON output. The `RUST_LOG` environment variable overrides the
/// level entirely.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(effective_level(&config.level, verbose)));

    if json_logs || config.format == "json" {
        // JSON format for machine parsing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Pretty format for humans
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Resolve the configured level string against the verbose flag.
/// Unrecognized strings fall back to `info`.
fn effective_level(configured: &str, verbose: bool) -> &'static str {
    let configured = LEVELS
        .iter()
        .copied()
        .find(|level| configured.eq_ignore_ascii_case(level))
        .unwrap_or("info");

    if verbose && configured != "trace" {
        "debug"
    } else {
        configured
    }
}
