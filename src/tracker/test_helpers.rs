//! Shared test helpers for creating JobTracker instances in tests.

use crate::config::JobConfig;
use crate::invoker::DownloadInvoker;
use crate::storage::FileStore;
use crate::tracker::JobTracker;
use crate::types::{Job, JobId};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Job settings suited to tests: two workers, a short timeout, no marker
pub(crate) fn test_job_config() -> JobConfig {
    JobConfig {
        max_concurrent_jobs: 2,
        timeout: Duration::from_secs(5),
        source_marker: None,
    }
}

/// Create a tracker over a fresh download directory.
/// Returns the tracker and the tempdir (which must be kept alive).
pub(crate) async fn create_test_tracker(
    invoker: Arc<dyn DownloadInvoker>,
    config: JobConfig,
) -> (JobTracker, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let store = FileStore::new(temp_dir.path().join("downloads"))
        .await
        .unwrap();

    let tracker = JobTracker::new(config, Arc::new(store), invoker);
    (tracker, temp_dir)
}

/// Poll until the job reaches a terminal state; panics after 5 seconds
pub(crate) async fn wait_for_terminal(tracker: &JobTracker, id: &JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = tracker.status(id).await.unwrap();
        if job.status.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {id} still {} after 5s",
            job.status
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Poll until `check` holds; panics after 5 seconds
pub(crate) async fn wait_until<F>(what: &str, mut check: F)
where
    F: AsyncFnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
