// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Remote cricket data API
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL every route is built on, without trailing slash
    pub base_url: String,
    /// Injected into every upstream query string, never sent to the browser
    pub api_key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub probe_on_start: bool,
}

/// Static dashboard page
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub file: String,
    /// Directory holding `file`; the executable's directory when unset
    #[serde(default)]
    pub dir: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (gateway, combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "gateway".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}
