//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CROSSWIKI_*)
//! 2. TOML config file (if CROSSWIKI_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CROSSWIKI_*)
/// 2. TOML config file (if CROSSWIKI_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite wiki database.
    ///
    /// Set via CROSSWIKI_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Deadline for a single storage write, in milliseconds.
    ///
    /// A write still uncommitted when the deadline passes is rolled back.
    /// Set via CROSSWIKI_STORE_TIMEOUT_MS environment variable.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// How long SQLite waits on a locked database before failing, in milliseconds.
    ///
    /// Set via CROSSWIKI_BUSY_TIMEOUT_MS environment variable.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Collapse repeated link targets within one page to a single edge.
    ///
    /// Set via CROSSWIKI_DEDUPE_LINKS environment variable.
    #[serde(default)]
    pub dedupe_links: bool,

    /// Create the index page at startup when it is missing.
    ///
    /// Set via CROSSWIKI_SEED_INDEX environment variable.
    #[serde(default = "default_true")]
    pub seed_index: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./crosswiki.sqlite")
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

fn default_busy_timeout_ms() -> u64 {
    2_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            store_timeout_ms: default_store_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            dedupe_links: false,
            seed_index: true,
        }
    }
}

impl AppConfig {
    /// Write deadline as Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// SQLite busy timeout as Duration.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CROSSWIKI_`
    /// 2. TOML file from `CROSSWIKI_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CROSSWIKI_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CROSSWIKI_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
