//! Configuration management for locale-vault
//!
//! Values come from built-in defaults, then an optional `config.toml`,
//! then `LOCALE_VAULT_*` environment variables.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_STORAGE_ROOT: &str = "./locales";
const DEFAULT_LOG_LEVEL: &str = "info";
const ENV_PREFIX: &str = "LOCALE_VAULT";

/// Complete storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VaultConfig {
    /// Directory holding the `Latest`, `Archive` and `Trash` trees
    /// Environment: LOCALE_VAULT_STORAGE_ROOT
    pub storage_root: String,

    /// Whether each written revision is fsynced before the write reports success
    /// Environment: LOCALE_VAULT_SYNC_WRITES
    pub sync_writes: bool,

    /// Fallback log filter when RUST_LOG is unset
    /// Environment: LOCALE_VAULT_LOG_LEVEL
    pub log_level: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
            sync_writes: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl VaultConfig {
    /// Load configuration from `./config.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the named file (extension optional, file optional)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::finish(settings)
    }

    /// Build configuration from TOML text without consulting the environment
    pub fn from_toml_str(text: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;

        Self::finish(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        Config::builder()
            .set_default("storage_root", DEFAULT_STORAGE_ROOT)?
            .set_default("sync_writes", true)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)
    }

    fn finish(settings: Config) -> Result<Self, config::ConfigError> {
        let config: VaultConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage_root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(config::ConfigError::Message(format!(
                "unknown log_level: {}",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }
}
