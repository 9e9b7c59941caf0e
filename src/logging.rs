//! Diagnostic output for the command-line tool.
//!
//! Events go to stderr so they never mix with generated files.  `RUST_LOG`
//! wins when it is set; otherwise the level follows the `-v` count.

use tracing_subscriber::EnvFilter;

/// Filter directive for a given number of `-v` flags.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.  Calling it twice is harmless; the second
/// call keeps the first subscriber.
pub fn setup_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_ok() {
        tracing::debug!(level = level_for(verbosity), "logging initialized");
    }
}
