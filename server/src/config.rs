use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

/// Which origins the CORS layer admits.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigin {
    Any,
    Exact(HeaderValue),
}

impl FromStr for AllowedOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(AllowedOrigin::Any),
            origin => HeaderValue::from_str(origin)
                .map(AllowedOrigin::Exact)
                .map_err(|_| ConfigError::InvalidCorsOrigin(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub static_dir: PathBuf,
    pub cors_origin: AllowedOrigin,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "sqlite://todo.db".to_string(),
            static_dir: PathBuf::from("frontend"),
            cors_origin: AllowedOrigin::Any,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source, falling back to
    /// the defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>()?,
            None => defaults.port,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin = match lookup("CORS_ORIGIN") {
            Some(raw) => raw.parse::<AllowedOrigin>()?,
            None => defaults.cors_origin,
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cors_origin,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = from_vars(&[]).unwrap();
        assert_eq!(cfg.socket_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.database_url, "sqlite://todo.db");
        assert_eq!(cfg.static_dir, PathBuf::from("frontend"));
        assert_eq!(cfg.cors_origin, AllowedOrigin::Any);
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_vars(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("STATIC_DIR", "/srv/www"),
            ("CORS_ORIGIN", "http://localhost:5173"),
        ])
        .unwrap();
        assert_eq!(cfg.socket_addr(), "127.0.0.1:3000");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(
            cfg.cors_origin,
            AllowedOrigin::Exact(HeaderValue::from_static("http://localhost:5173"))
        );
    }

    #[test]
    fn rejects_bad_ports() {
        assert!(matches!(
            from_vars(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            from_vars(&[("PORT", "70000")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            from_vars(&[("PORT", "0")]),
            Err(ConfigError::PortOutOfRange(0))
        ));
    }

    #[test]
    fn rejects_unusable_cors_origin() {
        assert!(matches!(
            from_vars(&[("CORS_ORIGIN", "http://bad\norigin")]),
            Err(ConfigError::InvalidCorsOrigin(_))
        ));
    }
}
