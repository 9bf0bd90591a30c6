//! Invoker used when no download tool is installed

use super::traits::DownloadInvoker;
use async_trait::async_trait;
use std::path::Path;

/// Fails every job with a pointer to the missing configuration
///
/// Lets the panel start and serve existing files on machines without the
/// download tool; each started job ends `failed` with this message.
pub struct UnavailableInvoker {
    binary_name: String,
}

impl UnavailableInvoker {
    /// Invoker reporting that `binary_name` could not be found
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
        }
    }
}

#[async_trait]
impl DownloadInvoker for UnavailableInvoker {
    async fn fetch(&self, _url: &str, _dest: &Path) -> crate::Result<()> {
        Err(crate::Error::ExternalTool(format!(
            "download tool {:?} is not available. \
             Configure invoker.program or ensure it is in PATH.",
            self.binary_name
        )))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}
