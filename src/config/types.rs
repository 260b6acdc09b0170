// Settings types module
// Defines the server's own settings, not the saved config document

use serde::Deserialize;

/// Main settings structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where and how the uploaded config document is written
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Target file, relative paths resolve against the working directory
    pub config_file: String,
    /// Write to a sibling temp file and rename it over the target
    pub atomic_writes: bool,
}

/// Logging settings
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection settings
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Lifetime cap in seconds for one connection, keep-alive idle time
    /// included. It does not reset between requests.
    pub connection_timeout: u64,
}

/// HTTP settings
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
}
