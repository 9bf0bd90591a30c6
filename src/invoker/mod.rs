//! External download tool boundary
//!
//! The actual link extraction and downloading is done by an external tool.
//! This module hides it behind the [`DownloadInvoker`] trait so the job
//! tracker can run any implementation:
//!
//! - [`CliInvoker`]: spawns the configured program with a templated argument list
//! - [`UnavailableInvoker`]: fails every job when no tool is installed
//! - [`ScriptedInvoker`]: deterministic success/failure/hang for tests
//!
//! ## Usage
//!
//! ```no_run
//! use grab_panel::config::InvokerConfig;
//! use grab_panel::invoker;
//!
//! let invoker = invoker::from_config(&InvokerConfig::default());
//! println!("using {} invoker", invoker.name());
//! ```

mod cli;
mod scripted;
mod traits;
mod unavailable;

pub use cli::CliInvoker;
pub use scripted::{ScriptedInvoker, ScriptedOutcome};
pub use traits::DownloadInvoker;
pub use unavailable::UnavailableInvoker;

use crate::config::InvokerConfig;
use std::sync::Arc;

/// Pick the invoker described by `config`
///
/// An explicit `program` wins; otherwise PATH is searched for `binary_name`
/// when `search_path` is set. Falls back to [`UnavailableInvoker`].
pub fn from_config(config: &InvokerConfig) -> Arc<dyn DownloadInvoker> {
    let invoker: Arc<dyn DownloadInvoker> = if let Some(ref program) = config.program {
        Arc::new(CliInvoker::new(program.clone(), config.args.clone()))
    } else if config.search_path {
        CliInvoker::from_path(&config.binary_name, config.args.clone())
            .map(|i| Arc::new(i) as Arc<dyn DownloadInvoker>)
            .unwrap_or_else(|| Arc::new(UnavailableInvoker::new(&config.binary_name)))
    } else {
        Arc::new(UnavailableInvoker::new(&config.binary_name))
    };

    if invoker.is_available() {
        tracing::info!(invoker = invoker.name(), "download invoker initialized");
    } else {
        tracing::warn!(
            binary = %config.binary_name,
            "download tool not found, jobs will fail until it is installed"
        );
    }

    invoker
}
