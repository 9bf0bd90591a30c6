//! Trait for the external download tool boundary

use async_trait::async_trait;
use std::path::Path;

/// Runs the bulk-download tool for one URL
///
/// Implementations write their artifacts into `dest` and report success or a
/// failure carrying diagnostic text. They do not enforce a timeout; the job
/// tracker bounds every call.
///
/// # Examples
///
/// ```no_run
/// use grab_panel::invoker::{CliInvoker, DownloadInvoker};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let invoker = CliInvoker::from_path("gallery-dl", vec!["-D".into(), "{dest}".into(), "{url}".into()])
///     .expect("gallery-dl not found");
///
/// invoker.fetch("https://example.test/album/123", Path::new("downloads")).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DownloadInvoker: Send + Sync {
    /// Download everything reachable from `url` into `dest`
    ///
    /// # Errors
    ///
    /// - [`Error::DownloadFailed`](crate::Error::DownloadFailed) when the tool ran and reported failure
    /// - [`Error::ExternalTool`](crate::Error::ExternalTool) when the tool could not be started
    async fn fetch(&self, url: &str, dest: &Path) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Whether this implementation can actually download anything
    fn is_available(&self) -> bool {
        true
    }
}
