// Configuration module entry point
// Layers the config file, GATEWAY_* environment variables and built-in defaults

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::StartupError;
use crate::routing::Credentials;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Config file used when `GATEWAY_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "gateway";

impl Config {
    /// Load configuration from the path in `GATEWAY_CONFIG`, or `gateway.toml`
    pub fn load() -> Result<Self, StartupError> {
        let path =
            std::env::var("GATEWAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (extension optional)
    /// A missing file is not an error; defaults and environment still apply
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GATEWAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("upstream.base_url", "https://api.cricapi.com/v1")?
            .set_default("upstream.api_key", "")?
            .set_default("upstream.user_agent", "CricAI/2.0")?
            .set_default("upstream.timeout_secs", 12)?
            .set_default("upstream.probe_timeout_secs", 8)?
            .set_default("upstream.probe_on_start", true)?
            .set_default("dashboard.file", "dashboard.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.server.port == 0 {
            return Err(StartupError::InvalidConfig(
                "server.port must not be 0".to_string(),
            ));
        }
        if self.upstream.timeout_secs == 0 || self.upstream.probe_timeout_secs == 0 {
            return Err(StartupError::InvalidConfig(
                "upstream timeouts must be greater than 0".to_string(),
            ));
        }
        let performance = &self.performance;
        if performance.read_timeout <= self.upstream.timeout_secs
            || performance.write_timeout <= self.upstream.timeout_secs
        {
            return Err(StartupError::InvalidConfig(format!(
                "performance.read_timeout and performance.write_timeout must exceed upstream.timeout_secs ({}s)",
                self.upstream.timeout_secs
            )));
        }
        let base = url::Url::parse(&self.upstream.base_url)
            .map_err(|e| StartupError::InvalidUpstreamUrl(self.upstream.base_url.clone(), e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StartupError::InvalidConfig(format!(
                "upstream.base_url must be http or https, got '{}'",
                base.scheme()
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| StartupError::InvalidAddress(addr, e))
    }

    /// Credentials handed to the route table
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.upstream.base_url, &self.upstream.api_key)
    }

    /// Absolute location of the dashboard page
    pub fn dashboard_path(&self) -> PathBuf {
        let dir = self.dashboard.dir.as_ref().map_or_else(
            || {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from("."))
            },
            PathBuf::from,
        );
        dir.join(&self.dashboard.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/gateway-config").unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.upstream.base_url, "https://api.cricapi.com/v1");
        assert_eq!(cfg.upstream.user_agent, "CricAI/2.0");
        assert_eq!(cfg.upstream.timeout_secs, 12);
        assert_eq!(cfg.upstream.probe_timeout_secs, 8);
        assert_eq!(cfg.dashboard.file, "dashboard.html");
        assert_eq!(cfg.logging.access_log_format, "gateway");
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 5050\n\n[upstream]\napi_key = \"file-key\"\n\n[dashboard]\ndir = \"/srv/www\""
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 5050);
        assert_eq!(cfg.upstream.api_key, "file-key");
        assert_eq!(cfg.dashboard_path(), PathBuf::from("/srv/www/dashboard.html"));
        // Untouched keys keep their defaults
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::load_from("/nonexistent/gateway-config").unwrap();
        cfg.upstream.base_url = "not a url".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(StartupError::InvalidUpstreamUrl(..))
        ));

        cfg.upstream.base_url = "ftp://api.example.com".to_string();
        assert!(matches!(cfg.validate(), Err(StartupError::InvalidConfig(_))));

        cfg.upstream.base_url = "https://api.example.com/v1".to_string();
        cfg.server.port = 0;
        assert!(matches!(cfg.validate(), Err(StartupError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_requires_room_for_upstream_call() {
        let mut cfg = Config::load_from("/nonexistent/gateway-config").unwrap();
        assert!(cfg.validate().is_ok());

        cfg.performance.write_timeout = cfg.upstream.timeout_secs;
        assert!(matches!(cfg.validate(), Err(StartupError::InvalidConfig(_))));

        cfg.performance.write_timeout = 30;
        cfg.performance.read_timeout = 5;
        assert!(matches!(cfg.validate(), Err(StartupError::InvalidConfig(_))));

        cfg.upstream.timeout_secs = 4;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("/nonexistent/gateway-config").unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "localhost".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(StartupError::InvalidAddress(..))
        ));
    }
}
