//! Console configuration.
//!
//! Loaded once at startup and passed explicitly; nothing reads the
//! environment after that.
//!
//! Sources, later ones override earlier ones:
//! 1. Built-in defaults
//! 2. `pizza.toml` in the working directory (optional)
//! 3. Environment variables with the `DB_` prefix (`DB_DIR`, `DB_NAME`,
//!    `DB_MAX_CONNECTIONS`)

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use pizza_db::DbConfig;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pizza.toml";

/// Prefix of the environment variables that override the file.
pub const ENV_PREFIX: &str = "DB";

const DEFAULT_DIR: &str = "./data";
const DEFAULT_NAME: &str = "pizza_db";
const DEFAULT_MAX_CONNECTIONS: i64 = 5;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the database file
    pub dir: PathBuf,

    /// Database name; the file is `<dir>/<name>.db`
    pub name: String,

    /// Pool size
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            dir: PathBuf::from(DEFAULT_DIR),
            name: DEFAULT_NAME.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS as u32,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `pizza.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration using `file` as the optional TOML source.
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("dir", DEFAULT_DIR)?
            .set_default("name", DEFAULT_NAME)?
            .set_default("max_connections", DEFAULT_MAX_CONNECTIONS)?
            .add_source(File::new(file, FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the deserializer cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("DB_NAME".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        Ok(())
    }

    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.dir.join(format!("{}.db", self.name))
    }

    /// Pool configuration for [`pizza_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path()).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
