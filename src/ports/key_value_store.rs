//! KeyValueStore port - durable client-side string storage.
//!
//! The local cache behind the preference model, the enrollment list and the
//! activity-day history. Calls are synchronous: every adapter is either in
//! memory or a small local file.

/// Errors that can occur during key-value operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("IO error for key '{key}': {message}")]
    Io { key: String, message: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StorageError::Io {
            key: key.into(),
            message: err.to_string(),
        }
    }
}

/// Port for reading and writing string values by key.
///
/// A missing key is `Ok(None)`, never an error.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
