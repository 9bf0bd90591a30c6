//! Application state for the API server

use crate::{Config, JobTracker};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the job tracker and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Job tracker, which also owns the file store
    pub tracker: Arc<JobTracker>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(tracker: Arc<JobTracker>, config: Arc<Config>) -> Self {
        Self { tracker, config }
    }
}
