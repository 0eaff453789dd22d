//! Application layer - stateful services over the domain and the ports.

mod enrollment_reconciler;
mod gamification_tracker;
mod preference_model;

pub use enrollment_reconciler::{
    enrollments_storage_key, EnrollmentReconciler, ReconcilerState, SkipReason, SyncOutcome,
    SyncReport, ENROLLMENTS_KEY_PREFIX, LEGACY_ENROLLMENT_KEYS,
};
pub use gamification_tracker::{
    activity_days_storage_key, GamificationTracker, ACTIVITY_DAYS_KEY_PREFIX,
};
pub use preference_model::{
    dna_storage_key, PreferenceModel, DEFAULT_WEIGHT, DNA_KEY_PREFIX, LEGACY_DNA_KEY,
};
