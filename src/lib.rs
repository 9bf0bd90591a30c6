//! # grab-panel
//!
//! Web control panel for a bulk-download tool.
//!
//! A URL submitted through the HTTP API becomes a background job: the
//! configured download tool runs against it with a shared download directory
//! as destination, and the job's status can be polled until it completes or
//! fails. The files the tool produced can then be listed, fetched, deleted or
//! cleared through the same API.
//!
//! - [`tracker`] - job registry and bounded worker pool
//! - [`invoker`] - the download tool boundary
//! - [`storage`] - the download directory
//! - [`api`] - axum router and server
//!
//! ## Quick Start
//!
//! ```no_run
//! use grab_panel::{Config, JobTracker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let tracker = Arc::new(JobTracker::from_config(&config).await?);
//!
//!     // Subscribe to events
//!     let mut events = tracker.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     grab_panel::run_with_shutdown(tracker, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Download tool boundary
pub mod invoker;
/// Logging setup for the binary
pub mod logging;
/// Download directory access
pub mod storage;
/// Background job tracking
pub mod tracker;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, Result, ToHttpStatus};
pub use invoker::{CliInvoker, DownloadInvoker, ScriptedInvoker, UnavailableInvoker};
pub use storage::FileStore;
pub use tracker::{JobRegistry, JobTracker};
pub use types::{ClearReport, Event, FileRecord, Job, JobId, JobStatus};

use std::sync::Arc;

/// Serve the HTTP API until a termination signal arrives, then shut down.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// The tracker stops accepting jobs once the server has stopped.
pub async fn run_with_shutdown(tracker: Arc<JobTracker>, config: Arc<Config>) -> Result<()> {
    api::start_api_server_with_shutdown(tracker, config, wait_for_signal()).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM");
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("received SIGINT");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("received SIGTERM");
            } else {
                tracing::error!("could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("received Ctrl+C");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    }
}
