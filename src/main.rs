//! grab-panel server binary.

use clap::Parser;
use grab_panel::{Config, JobTracker, logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Web control panel for a bulk-download tool.
#[derive(Debug, Parser)]
#[command(name = "grab-panel", version)]
#[command(
    about = "Run a bulk-download tool from the browser and manage its files",
    long_about = None
)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted.
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Directory the download tool writes into.
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Run up to N download jobs at once.
    #[arg(long, value_name = "N")]
    max_concurrent: Option<usize>,
}

impl Cli {
    /// Load the config file (if any) and apply command-line overrides
    fn into_config(self) -> grab_panel::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = self.download_dir {
            config.storage.download_dir = dir;
        }
        if let Some(n) = self.max_concurrent {
            config.jobs.max_concurrent_jobs = n;
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> grab_panel::Result<()> {
    let config = Arc::new(cli.into_config()?);

    tracing::info!(
        download_dir = %config.download_dir().display(),
        bind = %config.server.api.bind_address,
        max_concurrent_jobs = config.jobs.max_concurrent_jobs,
        "starting grab-panel"
    );

    let tracker = Arc::new(JobTracker::from_config(&config).await?);
    grab_panel::run_with_shutdown(tracker, config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "grab-panel stopped with an error");
            ExitCode::FAILURE
        }
    }
}
