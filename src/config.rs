//! Configuration types for grab-panel

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Placeholder replaced by the submitted URL in [`InvokerConfig::args`]
pub const URL_PLACEHOLDER: &str = "{url}";

/// Placeholder replaced by the download directory in [`InvokerConfig::args`]
pub const DEST_PLACEHOLDER: &str = "{dest}";

/// Download directory settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory the download tool writes into (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Prefix for file retrieval URLs, e.g. "https://panel.example.net".
    ///
    /// When unset, retrieval URLs are relative (`/download/<name>`).
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            public_base_url: None,
        }
    }
}

/// Job tracker settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobConfig {
    /// Maximum number of download tool invocations running at once (default: 2)
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Hard bound on a single invocation, in seconds (default: 3600)
    #[serde(default = "default_job_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Substring a submitted URL must contain, e.g. a site's host name.
    ///
    /// `None` accepts any http(s) URL.
    #[serde(default)]
    pub source_marker: Option<String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            timeout: default_job_timeout(),
            source_marker: None,
        }
    }
}

/// External download tool settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvokerConfig {
    /// Explicit path to the download tool (auto-detected if None)
    #[serde(default)]
    pub program: Option<PathBuf>,

    /// Binary name searched in PATH when `program` is unset (default: "gallery-dl")
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Argument template; `{url}` and `{dest}` are substituted per job
    #[serde(default = "default_invoker_args")]
    pub args: Vec<String>,

    /// Whether to search PATH for the tool if `program` is not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            program: None,
            binary_name: default_binary_name(),
            args: default_invoker_args(),
            search_path: true,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for grab-panel
///
/// Loaded from a TOML file with one table per section:
///
/// ```toml
/// [storage]
/// download_dir = "/srv/downloads"
///
/// [jobs]
/// max_concurrent_jobs = 4
/// timeout = 3600
/// source_marker = "example.net"
///
/// [invoker]
/// binary_name = "gallery-dl"
/// args = ["--directory", "{dest}", "{url}"]
///
/// [server.api]
/// bind_address = "127.0.0.1:5000"
/// ```
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download directory settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Job tracker settings
    #[serde(default)]
    pub jobs: JobConfig,

    /// External download tool settings
    #[serde(default)]
    pub invoker: InvokerConfig,

    /// API server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.storage.download_dir
    }

    /// Read and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config = Self::from_toml(&data)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(data: &str) -> Result<Self> {
        let config: Config = toml::from_str(data).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.jobs.max_concurrent_jobs == 0 {
            return Err(Error::Config {
                message: "max_concurrent_jobs must be at least 1".into(),
                key: Some("jobs.max_concurrent_jobs".into()),
            });
        }

        if self.jobs.timeout.is_zero() {
            return Err(Error::Config {
                message: "timeout must be greater than zero".into(),
                key: Some("jobs.timeout".into()),
            });
        }

        if let Some(marker) = &self.jobs.source_marker
            && marker.trim().is_empty()
        {
            return Err(Error::Config {
                message: "source_marker must not be blank; remove it to accept any site".into(),
                key: Some("jobs.source_marker".into()),
            });
        }

        if !self.invoker.args.iter().any(|a| a.contains(URL_PLACEHOLDER)) {
            return Err(Error::Config {
                message: format!("args must contain the {URL_PLACEHOLDER} placeholder"),
                key: Some("invoker.args".into()),
            });
        }

        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_job_timeout() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_binary_name() -> String {
    "gallery-dl".into()
}

fn default_invoker_args() -> Vec<String> {
    vec![
        "--directory".into(),
        DEST_PLACEHOLDER.into(),
        URL_PLACEHOLDER.into(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
