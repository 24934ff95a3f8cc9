//! Startup error types
//!
//! Request handling never fails; these cover everything that can stop the
//! gateway from coming up.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid listen address '{0}': {1}")]
    InvalidAddress(String, #[source] std::net::AddrParseError),

    #[error("invalid upstream base URL '{0}': {1}")]
    InvalidUpstreamUrl(String, #[source] url::ParseError),

    #[error("failed to build upstream HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to initialize logger: {0}")]
    Logger(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
