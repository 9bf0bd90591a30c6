//! In-memory job table

use crate::types::{FileRecord, Job, JobId, JobStatus};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Entry {
    /// Insertion order, used for newest-first listing
    seq: u64,
    job: Job,
}

#[derive(Debug, Default)]
struct Table {
    next_seq: u64,
    entries: HashMap<JobId, Entry>,
}

/// Process-wide map from job id to job state
///
/// Every transition happens under the write lock and goes through the
/// forward-only methods on [`Job`], so a reader never observes a skipped or
/// reverted status. Nothing is persisted and nothing is evicted except by
/// [`JobRegistry::clear`].
#[derive(Debug, Default)]
pub struct JobRegistry {
    table: RwLock<Table>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job
    pub async fn insert(&self, job: Job) {
        let mut table = self.table.write().await;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.entries.insert(job.id.clone(), Entry { seq, job });
    }

    /// Point-in-time copy of one job
    pub async fn get(&self, id: &JobId) -> Option<Job> {
        self.table
            .read()
            .await
            .entries
            .get(id)
            .map(|entry| entry.job.clone())
    }

    /// Copies of all jobs, newest first
    pub async fn list(&self) -> Vec<Job> {
        let table = self.table.read().await;
        let mut entries: Vec<&Entry> = table.entries.values().collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.into_iter().map(|entry| entry.job.clone()).collect()
    }

    /// Number of jobs currently tracked
    pub async fn len(&self) -> usize {
        self.table.read().await.entries.len()
    }

    /// Whether no jobs are tracked
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.entries.is_empty()
    }

    /// Number of jobs in `status`
    pub async fn count_with_status(&self, status: JobStatus) -> usize {
        self.table
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.job.status == status)
            .count()
    }

    /// Drop every job record, returning how many were removed
    pub async fn clear(&self) -> usize {
        let mut table = self.table.write().await;
        let removed = table.entries.len();
        table.entries.clear();
        removed
    }

    /// Remove one job record
    pub(crate) async fn remove(&self, id: &JobId) -> Option<Job> {
        self.table
            .write()
            .await
            .entries
            .remove(id)
            .map(|entry| entry.job)
    }

    /// `Pending → Running`; returns the job's URL if the transition happened
    pub(crate) async fn mark_running(&self, id: &JobId) -> Option<String> {
        let mut table = self.table.write().await;
        let entry = table.entries.get_mut(id)?;
        entry.job.start().then(|| entry.job.url.clone())
    }

    /// `Running → Completed`; false if the job is gone or not running
    pub(crate) async fn complete(&self, id: &JobId, files: Vec<FileRecord>) -> bool {
        let mut table = self.table.write().await;
        match table.entries.get_mut(id) {
            Some(entry) => entry.job.complete(files),
            None => false,
        }
    }

    /// `Running → Failed`; false if the job is gone or not running
    pub(crate) async fn fail(&self, id: &JobId, error: String) -> bool {
        let mut table = self.table.write().await;
        match table.entries.get_mut(id) {
            Some(entry) => entry.job.fail(error),
            None => false,
        }
    }
}
