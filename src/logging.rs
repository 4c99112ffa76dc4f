//! Logging and tracing utilities for bridged providers.
//!
//! The bridge logs through the `tracing` ecosystem. Process-wide output goes
//! to **stderr** so it never interleaves with anything a provider binary
//! prints on stdout.
//!
//! Hosts that want the bridge's log lines routed somewhere else (for example
//! back to the engine that launched the provider) use [`with_log_sink`],
//! which scopes a subscriber to a closure instead of installing a global one.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `hemmer_bridge=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show what auto-aliasing decided during schema generation
//! RUST_LOG=hemmer_bridge=debug ./my-provider-tfgen
//! ```

use tracing_subscriber::{fmt, fmt::MakeWriter, prelude::*, EnvFilter};

/// Initialize the default logging subscriber.
///
/// This sets up a `tracing` subscriber that:
/// - Writes to **stderr**
/// - Respects the `RUST_LOG` environment variable for filtering
/// - Defaults to `info` level if `RUST_LOG` is not set
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level.
///
/// Like [`init_logging`], but allows specifying a default log level
/// that will be used if `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this function does not panic if a subscriber
/// has already been set.
pub fn try_init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

/// Run `f` with all bridge log output routed into `sink`.
///
/// The subscriber is only active on the current thread for the duration of
/// `f`; any global subscriber is left untouched and resumes afterwards.
/// `level` is an [`EnvFilter`] directive such as `"debug"` or
/// `"hemmer_bridge=trace"`. An unparsable directive falls back to `info`.
///
/// # Example
///
/// ```
/// use hemmer_bridge::logging::with_log_sink;
///
/// let answer = with_log_sink(std::io::sink, "debug", || {
///     tracing::debug!("routed to the sink");
///     42
/// });
/// assert_eq!(answer, 42);
/// ```
pub fn with_log_sink<W, F, R>(sink: W, level: &str, f: F) -> R
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    F: FnOnce() -> R,
{
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(sink)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    tracing::subscriber::with_default(subscriber, f)
}
