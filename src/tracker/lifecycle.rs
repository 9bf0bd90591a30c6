//! Shutdown coordination

use super::JobTracker;
use crate::types::JobStatus;
use std::sync::atomic::Ordering;

impl JobTracker {
    /// Stop accepting jobs and stop the queue processor
    ///
    /// Jobs already running are not cancelled; they finish in the background
    /// for as long as the runtime lives. Jobs still waiting in the queue stay
    /// `pending`. Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        self.queue_state.accepting_new.store(false, Ordering::SeqCst);
        self.queue_state.shutdown_token.cancel();
        // Running jobs keep their permits; only new acquisitions fail
        self.queue_state.concurrent_limit.close();

        let handle = self.queue_state.processor.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "queue processor ended abnormally");
        }

        let running = self.registry.count_with_status(JobStatus::Running).await;
        let pending = self.registry.count_with_status(JobStatus::Pending).await;
        tracing::info!(running, pending, "job tracker stopped accepting work");
    }

    /// Whether `start` still accepts new jobs
    pub fn is_accepting(&self) -> bool {
        self.queue_state.accepting_new.load(Ordering::SeqCst)
    }
}
