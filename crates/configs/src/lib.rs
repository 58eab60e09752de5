//! # configs
//!
//! Typed runtime settings. Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional)
//! 4. environment variables prefixed `RB__`, with `__` between nesting
//!    levels, e.g. `RB__STORAGE__BACKEND=sqlite`
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.

use config::{Config, Environment, File, Map};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// e.g. `sqlite:rusty_board.db`
    pub database_url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListingSettings {
    pub thread_limit: usize,
    pub reply_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordHashing {
    Plain,
    Argon2,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordSettings {
    pub scheme: PasswordHashing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` overrides it
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub listing: ListingSettings,
    pub passwords: PasswordSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, then the layered sources from the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
        }
        Self::from_sources(Some("config"), Environment::with_prefix("RB"))
    }

    /// Layers defaults, the optional TOML files under `dir`, and `env`.
    pub fn from_sources(dir: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("storage.backend", "memory")?
            .set_default("storage.database_url", "sqlite::memory:")?
            .set_default("storage.max_connections", 5)?
            .set_default("listing.thread_limit", 10)?
            .set_default("listing.reply_limit", 3)?
            .set_default("passwords.scheme", "plain")?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?;

        if let Some(dir) = dir {
            builder = builder
                .add_source(File::with_name(&format!("{dir}/default")).required(false))
                .add_source(File::with_name(&format!("{dir}/local")).required(false));
        }

        let settings: Settings = builder
            .add_source(env.prefix_separator("__").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults only; no files, no environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_sources(None, Environment::with_prefix("RB").source(Some(Map::new())))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.thread_limit == 0 || self.listing.reply_limit == 0 {
            return Err(ConfigError::Invalid(
                "listing limits must be at least 1".to_string(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
