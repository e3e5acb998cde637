//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Integrity engine configuration.
    #[serde(default)]
    pub integrity: IntegrityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "cimiento=info".to_string()
}

/// Integrity engine configuration.
///
/// Only presentation concerns live here. The canonical hashing format is
/// versioned in code and is never configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrityConfig {
    /// Number of hash characters kept when a hash is written to the logs.
    #[serde(default = "default_log_hash_prefix")]
    pub log_hash_prefix: usize,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            log_hash_prefix: default_log_hash_prefix(),
        }
    }
}

fn default_log_hash_prefix() -> usize {
    16
}

impl AppConfig {
    /// Loads configuration from `.env`, config files and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CIMIENTO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
