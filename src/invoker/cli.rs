//! Download invoker that shells out to an external program

use super::traits::DownloadInvoker;
use crate::config::{DEST_PLACEHOLDER, URL_PLACEHOLDER};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Runs a download program with a templated argument list
///
/// Every argument has `{url}` and `{dest}` substituted before the program is
/// spawned. Exit status zero is success. On failure the diagnostic is the
/// trimmed stderr, falling back to stdout, falling back to the exit status.
///
/// The child is spawned with `kill_on_drop`, so dropping the future (for
/// example when the job tracker's timeout fires) kills the process.
pub struct CliInvoker {
    program: PathBuf,
    args: Vec<String>,
}

impl CliInvoker {
    /// Create an invoker with an explicit program path
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self { program, args }
    }

    /// Attempt to find `binary_name` in PATH
    ///
    /// Returns `None` if the binary is not installed.
    pub fn from_path(binary_name: &str, args: Vec<String>) -> Option<Self> {
        which::which(binary_name)
            .ok()
            .map(|program| Self::new(program, args))
    }

    /// Path of the program this invoker runs
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Substitute placeholders for one invocation
    pub(crate) fn build_args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        let dest = dest.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                OsString::from(
                    arg.replace(URL_PLACEHOLDER, url)
                        .replace(DEST_PLACEHOLDER, &dest),
                )
            })
            .collect()
    }
}

#[async_trait]
impl DownloadInvoker for CliInvoker {
    async fn fetch(&self, url: &str, dest: &Path) -> crate::Result<()> {
        let output = Command::new(&self.program)
            .args(self.build_args(url, dest))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if output.status.success() {
            tracing::debug!(
                program = %self.program.display(),
                url,
                stdout_bytes = output.stdout.len(),
                "download tool finished"
            );
            return Ok(());
        }

        Err(crate::Error::DownloadFailed(failure_diagnostic(
            &output.stdout,
            &output.stderr,
            output.status,
        )))
    }

    fn name(&self) -> &'static str {
        "cli"
    }
}

/// Pick the most useful text out of a failed run
fn failure_diagnostic(stdout: &[u8], stderr: &[u8], status: std::process::ExitStatus) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    let stdout = String::from_utf8_lossy(stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }

    format!("download tool exited with {status}")
}
