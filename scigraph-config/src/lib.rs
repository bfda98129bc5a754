//! Layered service configuration: defaults, a config-directory override,
//! then environment variables, following the same precedence order the
//! rest of the stack uses for its own configuration.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid duration '{value}' for {field}: {source}")]
    Duration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}

/// The scigraph HTTP service's runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to, e.g. "0.0.0.0:8080".
    pub listen_addr: String,
    /// Database used when a request does not name one explicitly.
    pub default_db: String,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
    /// Humantime-formatted request timeout, e.g. "30s".
    pub request_timeout: String,
    /// `tracing_subscriber::EnvFilter` directive string.
    pub log_filter: String,
    /// Directory schema JSON is loaded from at startup, if any.
    pub schema_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            default_db: "dms0".to_string(),
            max_body_bytes: 16 * 1024 * 1024,
            request_timeout: "30s".to_string(),
            log_filter: "info".to_string(),
            schema_dir: default_schema_dir(),
        }
    }
}

fn default_schema_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scigraph").map(|dirs| dirs.config_dir().to_path_buf())
}

impl ServiceConfig {
    /// Loads configuration from, in increasing precedence: built-in
    /// defaults, `config/defaults.toml`, `config/<SCIGRAPH_ENV>.toml`, and
    /// `SCIGRAPH_`-prefixed environment variables (`SCIGRAPH_LISTEN_ADDR`,
    /// ...).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let env_name = std::env::var("SCIGRAPH_ENV").unwrap_or_else(|_| "development".to_string());

        let defaults = config::Config::try_from(&Self::default())?;
        let builder = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config/defaults").required(false))
            .add_source(config::File::with_name(&format!("config/{env_name}")).required(false))
            .add_source(config::Environment::with_prefix("SCIGRAPH").separator("_"));

        let built = builder.build()?;
        Ok(built.try_deserialize()?)
    }

    /// A process-wide, lazily loaded configuration instance.
    pub fn get() -> &'static ServiceConfig {
        static CONFIG: OnceLock<ServiceConfig> = OnceLock::new();
        CONFIG.get_or_init(|| Self::load().expect("failed to load scigraph configuration"))
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.request_timeout).map_err(|source| ConfigError::Duration {
            field: "request_timeout",
            value: self.request_timeout.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_and_have_a_sane_timeout() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.request_timeout().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_malformed_duration() {
        let mut cfg = ServiceConfig::default();
        cfg.request_timeout = "not a duration".to_string();
        assert!(cfg.request_timeout().is_err());
    }

    #[test]
    fn env_override_takes_precedence_over_defaults() {
        std::env::set_var("SCIGRAPH_DEFAULT_DB", "dms-test");
        let cfg = ServiceConfig::load().unwrap();
        assert_eq!(cfg.default_db, "dms-test");
        std::env::remove_var("SCIGRAPH_DEFAULT_DB");
    }
}
