//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: JOBBOARD_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/jobboard-service/config.toml
//! 4. System directory: /etc/jobboard-service/config.toml
//! 5. Default values
//!
//! The loaded value is validated eagerly; callers get either a usable
//! [`Config`] or an error that should abort startup.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Directory and XDG prefix used when searching for config files
pub const CONFIG_DIR_NAME: &str = "jobboard-service";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "JOBBOARD_";

/// Store URL schemes accepted at startup
pub const SUPPORTED_STORE_SCHEMES: &[&str] = &["ws://", "wss://", "http://", "https://", "mem://"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Referential integrity configuration
    #[serde(default)]
    pub integrity: IntegrityConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds, also the deadline for each store call
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Time in-flight requests get to finish once shutdown starts
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// Document store configuration
///
/// The URL scheme selects the backend: `mem://` runs the in-process store,
/// `ws`/`wss`/`http`/`https` connect to SurrealDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Namespace to select after connecting
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Database to select after connecting
    #[serde(default = "default_database")]
    pub database: String,

    /// Root username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Root password (optional)
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum retry attempts for establishing the connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

/// Referential integrity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Verify foreign keys on create and guard deletes of referenced documents.
    ///
    /// Turning this off wires a resolver that reports every reference valid.
    #[serde(default = "default_true")]
    pub enforce_references: bool,
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode: "permissive", "restrictive", or "disabled"
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            namespace: default_namespace(),
            database: default_database(),
            username: None,
            password: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            enforce_references: true,
        }
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_store_url() -> String {
    "mem://".to_string()
}

fn default_namespace() -> String {
    "jobboard".to_string()
}

fn default_database() -> String {
    "jobs_db".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    10
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

impl Config {
    /// Load configuration from all sources and validate it
    ///
    /// Environment variables (JOBBOARD_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()));

        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self> {
        let mut config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.store.url = config.store.url.trim().to_string();
        config.validate()?;
        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR_NAME);
        if let Some(path) = xdg_dirs.find_config_file("config.toml") {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        );

        paths
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<()> {
        let url = self.store.url.as_str();
        if url.is_empty() {
            return Err(Error::InvalidConfig("store.url must not be empty".to_string()));
        }
        if !SUPPORTED_STORE_SCHEMES
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            return Err(Error::InvalidConfig(format!(
                "store.url must start with one of {}",
                SUPPORTED_STORE_SCHEMES.join(", ")
            )));
        }
        if self.service.port == 0 {
            return Err(Error::InvalidConfig(
                "service.port must be between 1 and 65535".to_string(),
            ));
        }
        if self.service.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "service.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.service.shutdown_grace_secs == 0 {
            return Err(Error::InvalidConfig(
                "service.shutdown_grace_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request and per-store-call deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    /// Grace period for in-flight requests on shutdown
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_grace_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: CONFIG_DIR_NAME.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                shutdown_grace_secs: default_shutdown_grace(),
                environment: default_environment(),
            },
            store: StoreConfig::default(),
            integrity: IntegrityConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}
