//! Runtime configuration.
//!
//! Values come from defaults, then an optional JSON file, then the
//! `POSTGEN_*` environment variables; later sources win.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default collection service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Environment variable overriding [`PostgenConfig::base_url`].
pub const ENV_BASE_URL: &str = "POSTGEN_BASE_URL";
/// Environment variable overriding [`PostgenConfig::timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "POSTGEN_TIMEOUT_MS";
/// Environment variable overriding [`PostgenConfig::user_agent`].
pub const ENV_USER_AGENT: &str = "POSTGEN_USER_AGENT";
/// Environment variable overriding [`PostgenConfig::collections_dir`].
pub const ENV_COLLECTIONS_DIR: &str = "POSTGEN_COLLECTIONS_DIR";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`PostgenConfig`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// An environment variable has an unusable value.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// The base URL is not an absolute http(s) URL.
    #[error("invalid base URL `{0}`")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built from the settings.
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

/// Settings for reaching the collection service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgenConfig {
    /// Collection service base URL, including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Local collections directory for the file-backed store.
    pub collections_dir: Option<PathBuf>,
}

impl Default for PostgenConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 30_000,
            user_agent: concat!("postgen/", env!("CARGO_PKG_VERSION")).to_string(),
            collections_dir: None,
        }
    }
}

impl PostgenConfig {
    /// Loads the configuration from `path` (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a value is invalid.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        let config = config.with_env(|name| std::env::var(name).ok())?;
        config.base_url()?;
        Ok(config)
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for a timeout that is not a number.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_TIMEOUT_MS,
                    value: timeout,
                })?;
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            self.user_agent = user_agent;
        }
        if let Some(dir) = lookup(ENV_COLLECTIONS_DIR).filter(|d| !d.trim().is_empty()) {
            self.collections_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }

    /// The parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is an absolute
    /// `http` or `https` URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidBaseUrl(self.base_url.clone()))?;
        if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
            Ok(url)
        } else {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        }
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
