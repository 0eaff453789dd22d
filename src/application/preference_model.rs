//! PreferenceModel - the persisted learning-DNA vector for one identity.
//!
//! Reads never fail: a missing, corrupt or unreadable value yields the
//! defaults. Writes are best-effort; a storage failure is logged and the
//! computed vector is still returned.

use std::sync::Arc;

use crate::domain::foundation::Identity;
use crate::domain::learning_dna::{get_suggestion, ActivityKind, Dimension, PreferenceVector};
use crate::ports::KeyValueStore;

/// Storage key prefix; the identity namespace is appended.
pub const DNA_KEY_PREFIX: &str = "smartedu:dna";

/// Un-namespaced key written by older clients; copied forward on first read.
pub const LEGACY_DNA_KEY: &str = "smartedu:dna";

/// Weight applied when an activity is recorded without one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

pub fn dna_storage_key(identity: &Identity) -> String {
    format!("{}:{}", DNA_KEY_PREFIX, identity.namespace())
}

/// Service owning the preference vector of one identity.
pub struct PreferenceModel {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PreferenceModel {
    pub fn new(store: Arc<dyn KeyValueStore>, identity: &Identity) -> Self {
        Self {
            store,
            key: dna_storage_key(identity),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Current vector, or the raw defaults when nothing usable is stored.
    pub fn load(&self) -> PreferenceVector {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => match self.migrate_legacy() {
                Some(raw) => raw,
                None => return PreferenceVector::DEFAULT,
            },
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to read preference vector: {}", e);
                return PreferenceVector::DEFAULT;
            }
        };
        match PreferenceVector::from_stored_json(&raw) {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!(key = %self.key, "discarding unreadable preference vector: {}", e);
                PreferenceVector::DEFAULT
            }
        }
    }

    /// Normalizes and persists `vector`, returning the normalized value.
    pub fn save(&self, vector: PreferenceVector) -> PreferenceVector {
        let normalized = vector.normalized();
        self.persist(&normalized);
        normalized
    }

    /// Applies one activity signal and saves the result.
    ///
    /// `weight` is clamped to `[0.5, 5]`; see [`PreferenceVector::apply_activity`].
    pub fn update(&self, kind: ActivityKind, weight: f64) -> PreferenceVector {
        let current = self.load();
        let next = current.apply_activity(kind, weight);
        tracing::debug!(key = %self.key, activity = %kind, weight, "applying activity signal");
        self.save(next)
    }

    /// Same as [`PreferenceModel::update`] with the default weight.
    pub fn record(&self, kind: ActivityKind) -> PreferenceVector {
        self.update(kind, DEFAULT_WEIGHT)
    }

    /// Human-readable hint for the strongest dimension of `vector`.
    pub fn get_suggestion(&self, vector: &PreferenceVector) -> String {
        get_suggestion(vector)
    }

    /// All dimensions of `vector`, strongest first.
    pub fn ranked(&self, vector: &PreferenceVector) -> Vec<(Dimension, f64)> {
        vector.ranked()
    }

    /// Persists the raw defaults and returns them.
    pub fn reset(&self) -> PreferenceVector {
        let defaults = PreferenceVector::DEFAULT;
        self.persist(&defaults);
        defaults
    }

    /// Copies the legacy value forward to the per-identity key.
    fn migrate_legacy(&self) -> Option<String> {
        let raw = match self.store.get(LEGACY_DNA_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key = LEGACY_DNA_KEY, "failed to read legacy preference vector: {}", e);
                return None;
            }
        };
        match self.store.set(&self.key, &raw) {
            Ok(()) => tracing::info!(from = LEGACY_DNA_KEY, to = %self.key, "migrated legacy preference vector"),
            Err(e) => tracing::warn!(key = %self.key, "failed to migrate legacy preference vector: {}", e),
        }
        Some(raw)
    }

    fn persist(&self, vector: &PreferenceVector) {
        let json = match serde_json::to_string(vector) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key = %self.key, "failed to serialize preference vector: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &json) {
            tracing::warn!(key = %self.key, "failed to persist preference vector: {}", e);
        }
    }
}
