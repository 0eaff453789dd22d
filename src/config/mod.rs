//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `SMARTEDU` prefix and
//! `__` between nested keys. Every section has defaults, so an empty
//! environment yields an offline guest configuration.
//!
//! # Example
//!
//! ```no_run
//! use smartedu_core::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod identity;
mod logging;
mod remote;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use remote::RemoteConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Local key-value store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Enrollment service (optional)
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Signed-in user, if any
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SMARTEDU` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SMARTEDU__REMOTE__BASE_URL=https://...` -> `remote.base_url`
    /// - `SMARTEDU__IDENTITY__USER_ID=u-42` -> `identity.user_id`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SMARTEDU")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.storage.validate()?;
        self.remote.validate()?;
        self.identity.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
