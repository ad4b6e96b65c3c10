//! # Configuration
//!
//! Settlement engine settings, layered as:
//!
//! 1. built-in defaults
//! 2. an optional config file (any format the `config` crate reads)
//! 3. `SETTLEMENT__*` environment variables, after `.env` is loaded
//!
//! ```text
//! SETTLEMENT__QUOTE_SYMBOLS=USDT,USD
//! SETTLEMENT__LOCK_TIMEOUT_MS=2000
//! SETTLEMENT__LOG__JSON=true
//! ```

use crate::domain::entities::QuoteSymbols;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SETTLEMENT";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `spot_settlement=debug`.
    pub level: String,
    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Settlement engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Quote currencies used to split listing names into base and quote.
    pub quote_symbols: Vec<String>,
    /// Longest wait for a user's lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Re-settle attempts after a guarded debit conflict.
    pub max_commit_retries: u32,
    /// Pause before each retry, in milliseconds.
    pub retry_backoff_ms: u64,
    /// PostgreSQL connection string; in-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// Logging.
    pub log: LogConfig,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            quote_symbols: vec!["USDT".to_string()],
            lock_timeout_ms: 5000,
            max_commit_retries: 3,
            retry_backoff_ms: 10,
            database_url: None,
            log: LogConfig::default(),
        }
    }
}

impl SettlementConfig {
    /// Loads `.env`, the optional file at `path` and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source is malformed or the result fails
    /// [`SettlementConfig::validate`].
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        let config: Self = builder
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document over the defaults, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is malformed or invalid.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an empty or malformed quote symbol
    /// set or a zero lock timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.quote_symbols()?;
        Ok(())
    }

    /// Returns the parsed quote symbol set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the set is empty or malformed.
    pub fn quote_symbols(&self) -> Result<QuoteSymbols, ConfigError> {
        QuoteSymbols::new(&self.quote_symbols).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Returns the lock timeout.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Returns the retry backoff.
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("quote_symbols")
        .try_parsing(true)
}
