// Settings module entry point
// Loads the server's own settings and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
#[cfg(test)]
pub use state::test_state;
pub use types::Config;

/// Environment variable prefix, e.g. `CONFIG_DROP_SERVER__PORT=8080`
const ENV_PREFIX: &str = "CONFIG_DROP";

impl Config {
    /// Load settings from the given file path (without extension).
    /// A missing file is not an error: the defaults below reproduce the
    /// stock behavior (port 3000 on all interfaces, `config.json` in cwd).
    pub fn load_from(settings_path: &str) -> Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(settings_path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.config_file", "config.json")?
            .set_default("storage.atomic_writes", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would panic the runtime builder or make the
    /// server unusable
    fn validate(&self) -> Result<(), ::config::ConfigError> {
        if self.server.workers == Some(0) {
            return Err(::config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if self.performance.connection_timeout == 0 {
            return Err(::config::ConfigError::Message(
                "performance.connection_timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.as_str();
        // Bare IPv6 literals need brackets before the port is appended
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        addr.parse().map_err(|e| format!("Invalid address '{addr}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config::load_from("settings-file-that-does-not-exist").unwrap()
    }

    #[test]
    fn test_defaults_match_stock_behavior() {
        let cfg = defaults();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.storage.config_file, "config.json");
        assert!(!cfg.storage.atomic_writes);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_socket_addr_ipv4() {
        let cfg = defaults();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_socket_addr_ipv6() {
        let mut cfg = defaults();
        cfg.server.host = "::1".to_string();
        cfg.server.port = 8080;
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "[::1]:8080");
    }

    #[test]
    fn test_socket_addr_invalid_host() {
        let mut cfg = defaults();
        cfg.server.host = "not a host".to_string();
        let err = cfg.get_socket_addr().unwrap_err();
        assert!(err.starts_with("Invalid address"));
    }

    fn load_toml(contents: &str) -> Result<Config, ::config::ConfigError> {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("server.toml"), contents).unwrap();
        let stem = dir.path().join("server");
        Config::load_from(stem.to_str().unwrap())
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = load_toml("[server]\nworkers = 0\n").unwrap_err();
        assert!(err.to_string().contains("server.workers"), "{err}");

        let cfg = load_toml("[server]\nworkers = 2\n").unwrap();
        assert_eq!(cfg.server.workers, Some(2));
    }

    #[test]
    fn test_zero_connection_timeout_rejected() {
        let err = load_toml("[performance]\nconnection_timeout = 0\n").unwrap_err();
        assert!(err.to_string().contains("performance.connection_timeout"), "{err}");
    }

    #[test]
    fn test_connection_timeout_setting() {
        assert_eq!(defaults().performance.connection_timeout, 30);
        let cfg = load_toml("[performance]\nconnection_timeout = 5\n").unwrap();
        assert_eq!(cfg.performance.connection_timeout, 5);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            "[server]\nport = 4100\n\n[storage]\nconfig_file = \"/tmp/saved.json\"\natomic_writes = true\n",
        )
        .unwrap();

        let stem = dir.path().join("server");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4100);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.config_file, "/tmp/saved.json");
        assert!(cfg.storage.atomic_writes);
    }
}
