//! Process configuration.
//!
//! `Config` is built once in `main` and handed to whatever needs it; there is
//! no global settings instance. Values come from the process environment,
//! optionally seeded from a `.env` file.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_DATABASE_URL: &str = "sqlite:///./todo.db";
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`")]
    Invalid { key: &'static str, value: String },
    #[error("unsupported DATABASE_URL `{0}`; expected sqlite:///<path>")]
    UnsupportedDatabaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing or blank keys
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let host = match get("HOST") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "HOST", value })?,
            None => DEFAULT_HOST,
        };

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_path: database_path_from_url(&database_url)?,
            host,
            port,
            log_level: get("LOG_LEVEL")
                .map(|level| level.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            environment: get("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            cors_origins: split_origins(
                &get("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Accepts `sqlite:///<path>` and `sqlite://<path>`.
fn database_path_from_url(url: &str) -> Result<PathBuf, ConfigError> {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ConfigError::UnsupportedDatabaseUrl(url.to_string()))?;
    if path == ":memory:" {
        return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
    }
    Ok(PathBuf::from(path))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./todo.db"));
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.environment, "development");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("DATABASE_URL", "sqlite:////var/lib/todo/todo.db"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("LOG_LEVEL", "DEBUG"),
            ("STATIC_DIR", "./static"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/todo/todo.db"));
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.static_dir, Some(PathBuf::from("./static")));
    }

    #[test]
    fn cors_origins_drop_blanks() {
        let config = config(&[("CORS_ORIGINS", " http://a.test , ,http://b.test,")]).unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config(&[("PORT", "  "), ("LOG_LEVEL", "")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert_eq!(
            config(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn non_sqlite_urls_are_rejected() {
        for url in ["postgres://localhost/todo", "sqlite://", "sqlite://:memory:"] {
            assert!(
                matches!(
                    config(&[("DATABASE_URL", url)]),
                    Err(ConfigError::UnsupportedDatabaseUrl(_))
                ),
                "{url}"
            );
        }
    }

    #[test]
    fn relative_sqlite_url_keeps_relative_path() {
        let config = config(&[("DATABASE_URL", "sqlite://data/todo.db")]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("data/todo.db"));
    }
}
