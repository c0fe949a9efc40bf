//! # ab-config
//!
//! Layered settings for the anonboard binary. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config/anonboard.toml` (optional)
//! 3. `ANONBOARD_*` environment variables, `__` between sections
//!    (e.g. `ANONBOARD_SERVER__PORT=8080`)
//! 4. the plain `PORT` and `DB_URI` variables common on hosting platforms
//!
//! A `.env` file in the working directory is loaded into the environment first.

use std::env;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = "config/anonboard";
const ENV_PREFIX: &str = "ANONBOARD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub keys: KeySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/public`
    pub public_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection URL, e.g. `sqlite:anonboard.db`
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Argon2 cost for delete-key hashes.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// env_logger filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Settings {
    /// Reads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        // Runs before the logger exists; a missing `.env` is the normal case.
        let _ = dotenvy::dotenv();

        let builder = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("database.url", env::var("DB_URI").ok())?;

        Self::finish(builder)
    }

    /// Defaults overlaid with a TOML document. Ignores the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::finish(defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url", "must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections", "must be at least 1".into()));
        }
        if self.keys.parallelism == 0 || self.keys.iterations == 0 {
            return Err(ConfigError::Invalid("keys", "iterations and parallelism must be at least 1".into()));
        }
        Ok(())
    }

    /// `host:port` for the HTTP listener.
    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000_i64)?
        .set_default("server.public_dir", "./public")?
        .set_default("database.url", "sqlite:anonboard.db")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        // argon2 crate defaults (19 MiB, 2 passes, 1 lane)
        .set_default("keys.memory_kib", 19_456_i64)?
        .set_default("keys.iterations", 2_i64)?
        .set_default("keys.parallelism", 1_i64)?
        .set_default("log.level", "info")
}
