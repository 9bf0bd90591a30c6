//! Background job tracking
//!
//! The [`JobTracker`] turns "download this URL" requests into background jobs:
//! - [`registry`] - the id → job table shared with the HTTP layer
//! - [`queue_processor`] - bounded worker pool that runs the download invoker
//! - [`lifecycle`] - shutdown coordination
//! - [`validation`] - submitted URL checks
//!
//! `start` only registers the job and queues it; the caller polls `status`.

mod lifecycle;
mod queue_processor;
mod registry;
mod validation;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use registry::JobRegistry;

use crate::config::{Config, JobConfig};
use crate::error::{Error, Result};
use crate::invoker::DownloadInvoker;
use crate::storage::FileStore;
use crate::types::{ClearReport, Event, Job, JobId};
use queue_processor::JobRunner;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, Semaphore, broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Queue and worker pool state
#[derive(Clone)]
pub(crate) struct QueueState {
    /// Job ids waiting for a worker slot
    pub(crate) queue_tx: mpsc::UnboundedSender<JobId>,
    /// Caps simultaneous invoker calls (max_concurrent_jobs)
    pub(crate) concurrent_limit: Arc<Semaphore>,
    /// Set to false during shutdown
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Stops the queue processor
    pub(crate) shutdown_token: CancellationToken,
    /// Queue processor task, taken on shutdown
    pub(crate) processor: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

/// Tracks download jobs and runs them on a bounded worker pool
///
/// Cloneable; all fields are shared.
///
/// # Examples
///
/// ```no_run
/// use grab_panel::{Config, JobTracker};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tracker = JobTracker::from_config(&Config::default()).await?;
///
/// let id = tracker.start("https://example.test/album/123").await?;
/// let job = tracker.status(&id).await?;
/// println!("{} is {}", job.id, job.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JobTracker {
    /// Job table, shared with the worker tasks
    pub(crate) registry: Arc<JobRegistry>,
    /// Download directory
    pub(crate) store: Arc<FileStore>,
    /// Download tool
    pub(crate) invoker: Arc<dyn DownloadInvoker>,
    /// Job settings
    pub(crate) config: Arc<JobConfig>,
    /// Process-wide id counter, never reset
    pub(crate) next_sequence: Arc<AtomicU64>,
    /// Event broadcast channel sender
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Queue and worker pool
    pub(crate) queue_state: QueueState,
}

impl JobTracker {
    /// Create a tracker and start its queue processor
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: JobConfig,
        store: Arc<FileStore>,
        invoker: Arc<dyn DownloadInvoker>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let (event_tx, _rx) = broadcast::channel(256);

        // Validation rejects 0, but a hand-built JobConfig may not be validated
        let permits = config.max_concurrent_jobs.max(1);
        let concurrent_limit = Arc::new(Semaphore::new(permits));
        let shutdown_token = CancellationToken::new();
        let registry = Arc::new(JobRegistry::new());

        let runner = JobRunner {
            registry: registry.clone(),
            store: store.clone(),
            invoker: invoker.clone(),
            timeout: config.timeout,
            event_tx: event_tx.clone(),
        };
        let processor = queue_processor::start_queue_processor(
            runner,
            queue_rx,
            concurrent_limit.clone(),
            shutdown_token.clone(),
        );

        let queue_state = QueueState {
            queue_tx,
            concurrent_limit,
            accepting_new: Arc::new(AtomicBool::new(true)),
            shutdown_token,
            processor: Arc::new(Mutex::new(Some(processor))),
        };

        let tracker = Self {
            registry,
            store,
            invoker,
            config: Arc::new(config),
            next_sequence: Arc::new(AtomicU64::new(0)),
            event_tx,
            queue_state,
        };

        tracing::info!(
            max_concurrent_jobs = permits,
            timeout_secs = tracker.config.timeout.as_secs(),
            invoker = tracker.invoker.name(),
            "job tracker started"
        );

        tracker
    }

    /// Build the file store and invoker described by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = FileStore::new(config.download_dir())
            .await?
            .with_public_base_url(config.storage.public_base_url.clone());
        let invoker = crate::invoker::from_config(&config.invoker);

        Ok(Self::new(config.jobs.clone(), Arc::new(store), invoker))
    }

    /// Register a download job for `url` and queue it
    ///
    /// Returns as soon as the job is registered in `pending` state. Invalid
    /// input creates no job.
    pub async fn start(&self, url: &str) -> Result<JobId> {
        if !self.queue_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let url = validation::validate_url(url, self.config.source_marker.as_deref())?;

        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let id = JobId::generate(sequence);

        self.registry.insert(Job::new(id.clone(), url.clone())).await;
        self.emit_event(Event::Queued {
            id: id.clone(),
            url: url.clone(),
        });

        if self.queue_state.queue_tx.send(id.clone()).is_err() {
            // Queue processor is gone; don't leave an orphaned pending job
            self.registry.remove(&id).await;
            return Err(Error::ShuttingDown);
        }

        tracing::info!(job_id = %id, url = %url, "job queued");

        Ok(id)
    }

    /// Point-in-time snapshot of one job
    pub async fn status(&self, id: &JobId) -> Result<Job> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("job {id}")))
    }

    /// Snapshots of every tracked job, newest first
    pub async fn jobs(&self) -> Vec<Job> {
        self.registry.list().await
    }

    /// Number of tracked jobs
    pub async fn job_count(&self) -> usize {
        self.registry.len().await
    }

    /// Forget every job record
    ///
    /// Running jobs keep running; their final update is dropped.
    pub async fn clear_jobs(&self) -> usize {
        let removed = self.registry.clear().await;
        tracing::debug!(removed, "job records cleared");
        removed
    }

    /// Empty the download directory, then forget every job record
    ///
    /// Job records are kept if the directory could not be fully cleared.
    pub async fn clear_all(&self) -> Result<ClearReport> {
        let report = self.store.clear().await?;
        let jobs = self.clear_jobs().await;

        tracing::info!(
            removed_entries = report.removed.len(),
            removed_jobs = jobs,
            "downloads cleared"
        );
        self.emit_event(Event::Cleared {
            removed: report.removed.len(),
        });

        Ok(report)
    }

    /// The download directory
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// The job table
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Name and availability of the download invoker
    pub fn invoker_info(&self) -> (&'static str, bool) {
        (self.invoker.name(), self.invoker.is_available())
    }

    /// Subscribe to job lifecycle events
    ///
    /// Subscribers that fall more than 256 events behind receive
    /// `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Send an event to all subscribers; dropped if nobody listens
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
