//! Core types for grab-panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a job
///
/// Opaque to callers. Built from a process-wide counter plus a random token,
/// so ids are never reused even after the job table is cleared.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Build the id for the `sequence`-th job of this process
    pub(crate) fn generate(sequence: u64) -> Self {
        let token: u32 = rand::random();
        Self(format!("dl-{sequence}-{token:08x}"))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status
///
/// Jobs move strictly forward: `Pending → Running → Completed | Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Registered and waiting for a worker slot
    Pending,
    /// Download tool is running
    Running,
    /// Download tool succeeded
    Completed,
    /// Download tool failed or timed out
    Failed,
}

impl JobStatus {
    /// Position in the lifecycle; terminal states share the highest rank
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether no further transitions are allowed
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Lowercase name as it appears on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file in the download directory
///
/// Derived from the filesystem on demand and never cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRecord {
    /// File name (basename)
    pub name: String,

    /// Absolute path under the download directory (server-side only)
    #[serde(skip)]
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,

    /// Link that serves the file as an attachment
    pub url: String,
}

/// Snapshot of one download job
///
/// `error` is only present on failed jobs and `files` only on completed jobs.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Job identifier
    pub id: JobId,

    /// Submitted source URL
    pub url: String,

    /// Current status
    pub status: JobStatus,

    /// Coarse completion hint (0-100)
    pub progress: u8,

    /// Diagnostic text of a failed job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Files present in the download directory when the job completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRecord>>,

    /// When the job was registered
    pub created_at: DateTime<Utc>,

    /// When the download tool was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// New job in `Pending` state
    pub fn new(id: JobId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            status: JobStatus::Pending,
            progress: 0,
            error: None,
            files: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// `Pending → Running`. Returns false if the job was not pending.
    pub(crate) fn start(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
        true
    }

    /// `Running → Completed`. Returns false if the job was not running.
    pub(crate) fn complete(&mut self, files: Vec<FileRecord>) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.files = Some(files);
        self.finished_at = Some(Utc::now());
        true
    }

    /// `Running → Failed`. Returns false if the job was not running.
    pub(crate) fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.status != JobStatus::Running {
            return false;
        }
        self.status = JobStatus::Failed;
        self.progress = 0;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        true
    }
}

/// Outcome of clearing the download directory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClearReport {
    /// Names of top-level entries that were removed
    pub removed: Vec<String>,
}

/// Job lifecycle events broadcast to subscribers
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Job registered and waiting for a worker slot
    Queued {
        /// Job ID
        id: JobId,
        /// Submitted URL
        url: String,
    },

    /// Download tool started
    Started {
        /// Job ID
        id: JobId,
    },

    /// Download tool succeeded
    Completed {
        /// Job ID
        id: JobId,
        /// Number of files in the download directory afterwards
        file_count: usize,
    },

    /// Download tool failed or timed out
    Failed {
        /// Job ID
        id: JobId,
        /// Diagnostic text
        error: String,
    },

    /// Download directory and job table were cleared
    Cleared {
        /// Number of top-level entries removed
        removed: usize,
    },
}
