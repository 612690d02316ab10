//! Diagnostic logging set-up for the binary.
//!
//! The library emits records through the `log` facade. The binary installs a
//! `tracing-subscriber` formatter on stderr, and its `tracing-log` bridge
//! forwards those records, so log lines never mix with the report on stdout.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Map `-v` occurrences and `-q` to a level filter.
///
/// Warnings are shown by default; each `-v` adds a level up to trace, and
/// `-q` silences everything but errors.
///
/// # Examples
///
/// ```
/// use env_lint::logging::level_for;
/// use tracing_subscriber::filter::LevelFilter;
///
/// assert_eq!(level_for(0, false), LevelFilter::WARN);
/// assert_eq!(level_for(2, false), LevelFilter::DEBUG);
/// assert_eq!(level_for(3, true), LevelFilter::ERROR);
/// ```
#[must_use]
pub const fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the stderr subscriber and the `log` bridge.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber or `log` backend is
/// already installed; the existing one stays in place.
pub fn init(level: LevelFilter) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(level)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .without_time(),
        )
        .try_init()
}
