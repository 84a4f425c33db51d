//! # Configuration
//!
//! Where the database lives and the checkout's policy values.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ATELIER_DB_PATH=/srv/atelier/atelier.db                            │
//! │     ATELIER_CREDIT_VALIDITY_DAYS=365                                   │
//! │     ATELIER_EXPIRY_COUNTING=inclusive                                  │
//! │     ATELIER_MAX_COMMIT_ATTEMPTS=5                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/atelier/atelier.toml (Linux)                             │
//! │     ~/Library/Application Support/com.atelier.atelier/atelier.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     730-day credits, exclusive counting, 3 commit attempts             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/atelier/atelier.db"
//! max_connections = 5
//!
//! [checkout]
//! credit_validity_days = 730
//! expiry_counting = "exclusive"   # exclusive | inclusive
//! max_commit_attempts = 3
//! ```

use atelier_core::{CreditPolicy, ExpiryCounting};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first start.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "atelier", "atelier")
        .map(|dirs| dirs.data_dir().join("atelier.db"))
        .unwrap_or_else(|| PathBuf::from("atelier.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[checkout]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Days a freshly bought course credit stays valid.
    #[serde(default = "default_validity_days")]
    pub credit_validity_days: u32,

    /// Whether the purchase day counts as day one.
    #[serde(default)]
    pub expiry_counting: ExpiryCounting,

    /// How many times a checkout is attempted when its bill id collides.
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
}

fn default_validity_days() -> u32 {
    atelier_core::credit::DEFAULT_VALIDITY_DAYS
}

fn default_max_commit_attempts() -> u32 {
    3
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            credit_validity_days: default_validity_days(),
            expiry_counting: ExpiryCounting::default(),
            max_commit_attempts: default_max_commit_attempts(),
        }
    }
}

impl CheckoutSettings {
    pub fn credit_policy(&self) -> CreditPolicy {
        CreditPolicy::new(self.credit_validity_days, self.expiry_counting)
    }
}

// =============================================================================
// Root
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtelierConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl AtelierConfig {
    /// Loads configuration: defaults, then the file (if present), then
    /// environment overrides, then validation.
    ///
    /// With `config_path = None` the platform config directory is used.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Checks value ranges.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.checkout.credit_validity_days == 0 {
            return Err(ConfigError::Invalid(
                "checkout.credit_validity_days must be greater than 0".into(),
            ));
        }

        if !(1..=10).contains(&self.checkout.max_commit_attempts) {
            return Err(ConfigError::Invalid(format!(
                "checkout.max_commit_attempts must be between 1 and 10, got {}",
                self.checkout.max_commit_attempts
            )));
        }

        Ok(())
    }

    /// Pool settings for `Database::new`.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// Applies `ATELIER_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged
    /// and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ATELIER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(days) = lookup("ATELIER_CREDIT_VALIDITY_DAYS") {
            match days.parse::<u32>() {
                Ok(d) => self.checkout.credit_validity_days = d,
                Err(_) => warn!(value = %days, "Ignoring non-numeric ATELIER_CREDIT_VALIDITY_DAYS"),
            }
        }

        if let Some(counting) = lookup("ATELIER_EXPIRY_COUNTING") {
            match counting.parse::<ExpiryCounting>() {
                Ok(c) => self.checkout.expiry_counting = c,
                Err(_) => warn!(value = %counting, "Unknown expiry counting in environment"),
            }
        }

        if let Some(attempts) = lookup("ATELIER_MAX_COMMIT_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(a) => self.checkout.max_commit_attempts = a,
                Err(_) => {
                    warn!(value = %attempts, "Ignoring non-numeric ATELIER_MAX_COMMIT_ATTEMPTS")
                }
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "atelier", "atelier")
            .map(|dirs| dirs.config_dir().join("atelier.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
