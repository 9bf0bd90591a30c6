//! Deterministic invoker for tests and demos

use super::traits::DownloadInvoker;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// What a [`ScriptedInvoker`] does on every call
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Write the listed files (relative path, contents) into `dest` and succeed
    Succeed(Vec<(String, Vec<u8>)>),
    /// Fail with the given diagnostic
    Fail(String),
    /// Never return; only a timeout ends the call
    Hang,
    /// Panic inside the call
    Panic,
}

/// Invoker with a fixed, configurable outcome
///
/// Optionally gated: each call then waits for a permit released through
/// [`ScriptedInvoker::release`], which lets tests hold jobs in `running`.
///
/// # Examples
///
/// ```
/// use grab_panel::invoker::{DownloadInvoker, ScriptedInvoker};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let invoker = ScriptedInvoker::succeed().with_file("a.jpg", vec![0u8; 10]);
///
/// invoker.fetch("https://example.test/album/123", dir.path()).await?;
/// assert_eq!(std::fs::metadata(dir.path().join("a.jpg"))?.len(), 10);
/// assert_eq!(invoker.calls(), 1);
/// # Ok(())
/// # }
/// ```
pub struct ScriptedInvoker {
    outcome: ScriptedOutcome,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedInvoker {
    /// Invoker with an explicit outcome
    pub fn new(outcome: ScriptedOutcome) -> Self {
        Self {
            outcome,
            delay: None,
            gate: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Succeeds without writing anything
    pub fn succeed() -> Self {
        Self::new(ScriptedOutcome::Succeed(Vec::new()))
    }

    /// Fails with `diagnostic`
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self::new(ScriptedOutcome::Fail(diagnostic.into()))
    }

    /// Never finishes
    pub fn hang() -> Self {
        Self::new(ScriptedOutcome::Hang)
    }

    /// Panics
    pub fn panic() -> Self {
        Self::new(ScriptedOutcome::Panic)
    }

    /// Add a file to write on success; ignored for other outcomes
    pub fn with_file(mut self, relative_path: impl Into<String>, contents: Vec<u8>) -> Self {
        if let ScriptedOutcome::Succeed(files) = &mut self.outcome {
            files.push((relative_path.into(), contents));
        }
        self
    }

    /// Sleep before producing the outcome
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every call until a permit is released
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let `n` gated calls proceed
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of calls started so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of calls currently inside `fetch`
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn run(&self, dest: &Path) -> crate::Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| crate::Error::ExternalTool(e.to_string()))?
                .forget();
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.outcome {
            ScriptedOutcome::Succeed(files) => {
                for (relative, contents) in files {
                    let path = dest.join(relative);
                    if let Some(parent) = path.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&path, contents).await?;
                }
                Ok(())
            }
            ScriptedOutcome::Fail(diagnostic) => {
                Err(crate::Error::DownloadFailed(diagnostic.clone()))
            }
            ScriptedOutcome::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            ScriptedOutcome::Panic => panic!("scripted invoker panic"),
        }
    }
}

/// Decrements the in-flight counter even if the call is dropped or panics
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DownloadInvoker for ScriptedInvoker {
    async fn fetch(&self, _url: &str, dest: &Path) -> crate::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        self.run(dest).await
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
