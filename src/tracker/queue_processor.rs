//! Queue processor - drains the job queue and runs each job under a concurrency permit.

use super::registry::JobRegistry;
use crate::error::Error;
use crate::invoker::DownloadInvoker;
use crate::storage::FileStore;
use crate::types::{Event, JobId};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a job task needs, without the tracker's queue sender
#[derive(Clone)]
pub(crate) struct JobRunner {
    pub(crate) registry: Arc<JobRegistry>,
    pub(crate) store: Arc<FileStore>,
    pub(crate) invoker: Arc<dyn DownloadInvoker>,
    pub(crate) timeout: Duration,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

/// Start the queue processor task
///
/// Loops until shutdown:
/// 1. Waits for the next job id on the queue
/// 2. Acquires a permit from the concurrency limiter (respects max_concurrent_jobs)
/// 3. Spawns a task that runs the job and releases the permit when done
///
/// Jobs are started in submission order. A job waiting for a permit stays `pending`.
pub(crate) fn start_queue_processor(
    runner: JobRunner,
    mut queue_rx: mpsc::UnboundedReceiver<JobId>,
    concurrent_limit: Arc<Semaphore>,
    shutdown_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let id = tokio::select! {
                _ = shutdown_token.cancelled() => break,
                next = queue_rx.recv() => match next {
                    Some(id) => id,
                    None => break,
                },
            };

            // Blocks while max_concurrent_jobs invocations are running
            let permit = tokio::select! {
                _ = shutdown_token.cancelled() => break,
                permit = concurrent_limit.clone().acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => break,
                },
            };

            let runner = runner.clone();
            tokio::spawn(async move {
                let _permit = permit;
                runner.run(id).await;
            });
        }

        debug!("queue processor stopped");
    })
}

impl JobRunner {
    /// Run one job to a terminal state
    ///
    /// Every failure, including a timeout or a panic inside the invoker, is
    /// recorded on the job and never propagates further.
    pub(crate) async fn run(&self, id: JobId) {
        let Some(url) = self.registry.mark_running(&id).await else {
            debug!(job_id = %id, "job removed before it started");
            return;
        };

        info!(job_id = %id, url = %url, invoker = self.invoker.name(), "job started");
        self.event_tx.send(Event::Started { id: id.clone() }).ok();

        let fetch = AssertUnwindSafe(self.invoker.fetch(&url, self.store.root())).catch_unwind();
        let outcome = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(Error::DownloadFailed("download task panicked".into())),
            Err(_elapsed) => Err(Error::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        };

        // The listing covers the whole directory, including other jobs' files
        let outcome = match outcome {
            Ok(()) => self.store.list().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(files) => {
                let file_count = files.len();
                if self.registry.complete(&id, files).await {
                    info!(job_id = %id, file_count, "job completed");
                    self.event_tx
                        .send(Event::Completed {
                            id: id.clone(),
                            file_count,
                        })
                        .ok();
                } else {
                    debug!(job_id = %id, "job removed while running, result dropped");
                }
            }
            Err(e) => {
                let diagnostic = e.job_diagnostic();
                warn!(job_id = %id, error = %diagnostic, "job failed");
                if self.registry.fail(&id, diagnostic.clone()).await {
                    self.event_tx
                        .send(Event::Failed {
                            id: id.clone(),
                            error: diagnostic,
                        })
                        .ok();
                } else {
                    debug!(job_id = %id, "job removed while running, result dropped");
                }
            }
        }
    }
}
