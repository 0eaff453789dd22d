//! Remote enrollment service configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 10;

/// Enrollment service connection settings
///
/// Without a `base_url` the client runs offline: local caching works and
/// `sync` is skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the API (e.g. `https://smartedu.example.com/api`)
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries on network errors and 5xx responses
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further retry
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Bearer token of the signed-in session
    pub session_token: Option<Secret<String>>,
}

impl RemoteConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Check if a remote store is configured
    pub fn is_enabled(&self) -> bool {
        self.base_url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Validate remote configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidRemoteUrl);
            }
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.max_retries > MAX_RETRIES {
            return Err(ValidationError::TooManyRetries);
        }

        Ok(())
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            session_token: None,
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    250
}
