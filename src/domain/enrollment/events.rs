//! Change notification broadcast after every local enrollment mutation.

use serde::{Deserialize, Serialize};

use super::Enrollment;
use crate::domain::foundation::ReconcilerId;

/// Event name used on the change bus.
pub const ENROLLMENTS_CHANGED: &str = "smartedu.enrollments.changed";

/// Full post-mutation list published to every other reconciler that shares
/// the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentsChanged {
    /// Local storage key the list belongs to.
    pub storage_key: String,
    /// Instance that made the change; it ignores its own broadcast.
    pub origin: ReconcilerId,
    pub reason: ChangeReason,
    pub enrollments: Vec<Enrollment>,
}

impl EnrollmentsChanged {
    pub fn new(
        storage_key: impl Into<String>,
        origin: ReconcilerId,
        reason: ChangeReason,
        enrollments: Vec<Enrollment>,
    ) -> Self {
        Self {
            storage_key: storage_key.into(),
            origin,
            reason,
            enrollments,
        }
    }

    pub fn event_type(&self) -> &'static str {
        ENROLLMENTS_CHANGED
    }
}

/// Why a reconciler published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Enrolled,
    ProgressUpdated,
    Removed,
    Reconciled,
}
