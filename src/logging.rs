//! Logging init: structured `tracing` output on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV_VAR: &str = "GRAB_PANEL_LOG";

/// Filter used when neither environment variable is set
pub const DEFAULT_FILTER: &str = "info,grab_panel=debug";

/// Build the log filter from `GRAB_PANEL_LOG`, then `RUST_LOG`, then the default
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging to stderr.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_logging() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("logging initialized");
    }
}
