//! Configuration module for mirrorsync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for mirrorsync.
///
/// Every section falls back to its defaults when omitted from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Mirroring backend (JSON-RPC) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the JSON-RPC endpoint; requests go to `{url}/json-rpc`.
    pub url: String,
    /// Optional session token sent in the `auth` member of every request.
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Coordinator timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between periodic status checks.
    pub status_check_interval_secs: u64,
    /// Milliseconds a stop request waits before reaching the backend.
    pub settle_delay_ms: u64,
    /// Minimum seconds without status checks after an unrecognized reply.
    pub fault_backoff_secs: u64,
    /// Capacity of the coordinator's inbound event queue.
    pub event_queue_capacity: usize,
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database holding sync preferences.
    pub database: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/mirrorsync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mirrorsync")
            .join("config.yaml")
    }

    /// Serialize to YAML, as written by `mirrorsync config init`.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("serializing config")
    }
}

// ---------------------------------------------------------------------------
// Duration helpers
// ---------------------------------------------------------------------------

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured base URL, parsed
    pub fn base_url(&self) -> Result<Url, String> {
        parse_backend_url(&self.url)
    }
}

/// Parses a backend base URL, accepting only `http`/`https` with a host
pub fn parse_backend_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("'{}' is not a URL: {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("'{}' must use http or https", raw));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("'{}' has no host", raw));
    }
    Ok(url)
}

impl SyncConfig {
    pub fn status_check_interval(&self) -> Duration {
        Duration::from_secs(self.status_check_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn fault_backoff(&self) -> Duration {
        Duration::from_secs(self.fault_backoff_secs)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:31339".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            status_check_interval_secs: 10,
            settle_delay_ms: 300,
            fault_backoff_secs: 30,
            event_queue_capacity: 64,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("mirrorsync")
                .join("mirrorsync.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.settle_delay_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- backend ---
        if let Err(message) = self.backend.base_url() {
            errors.push(ValidationError {
                field: "backend.url".into(),
                message,
            });
        }
        if self.backend.request_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "backend.request_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if matches!(&self.backend.auth_token, Some(token) if token.trim().is_empty()) {
            errors.push(ValidationError {
                field: "backend.auth_token".into(),
                message: "must not be blank when set".into(),
            });
        }

        // --- sync ---
        if self.sync.status_check_interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.status_check_interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.event_queue_capacity == 0 {
            errors.push(ValidationError {
                field: "sync.event_queue_capacity".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.settle_delay_ms > 60_000 {
            errors.push(ValidationError {
                field: "sync.settle_delay_ms".into(),
                message: format!(
                    "settle_delay_ms ({}) must not exceed 60000",
                    self.sync.settle_delay_ms
                ),
            });
        }

        // --- storage ---
        if self.storage.database.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.database".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use mirrorsync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .backend_url("http://127.0.0.1:31339")
///     .sync_settle_delay_ms(500)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- backend ---

    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.url = url.into();
        self
    }

    pub fn backend_auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.backend.auth_token = Some(token.into());
        self
    }

    pub fn backend_request_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.backend.request_timeout_secs = seconds;
        self
    }

    // --- sync ---

    pub fn sync_status_check_interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.status_check_interval_secs = seconds;
        self
    }

    pub fn sync_settle_delay_ms(mut self, millis: u64) -> Self {
        self.config.sync.settle_delay_ms = millis;
        self
    }

    pub fn sync_fault_backoff_secs(mut self, seconds: u64) -> Self {
        self.config.sync.fault_backoff_secs = seconds;
        self
    }

    pub fn sync_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.sync.event_queue_capacity = capacity;
        self
    }

    // --- storage ---

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
