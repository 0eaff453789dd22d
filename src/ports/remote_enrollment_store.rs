//! RemoteEnrollmentStore port - the server-side enrollment records.
//!
//! The server keeps one record per (user, course) and only ever raises
//! progress, so an upsert with a lower value is harmless.

use async_trait::async_trait;

use crate::domain::enrollment::CourseProgress;
use crate::domain::foundation::{CourseId, Percentage};

/// Errors from the remote enrollment store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Not authorized to access enrollments")]
    Unauthorized,

    #[error("Enrollment service unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::Unavailable(_) | RemoteError::Network(_))
    }
}

/// Port for the authenticated user's server-side enrollments.
#[async_trait]
pub trait RemoteEnrollmentStore: Send + Sync {
    /// Lists every enrollment the server holds for the user.
    async fn list(&self) -> Result<Vec<CourseProgress>, RemoteError>;

    /// Creates or raises the record for `course_id`.
    ///
    /// Returns the record as stored, which may be ahead of `progress`.
    async fn upsert(
        &self,
        course_id: &CourseId,
        progress: Percentage,
    ) -> Result<CourseProgress, RemoteError>;

    /// Deletes the record for `course_id`. Deleting a missing record succeeds.
    async fn delete(&self, course_id: &CourseId) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_enrollment_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn RemoteEnrollmentStore) {}
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(RemoteError::Network("reset".into()).is_retryable());
        assert!(RemoteError::Unavailable("502".into()).is_retryable());
        assert!(!RemoteError::Unauthorized.is_retryable());
        assert!(!RemoteError::InvalidResponse("bad json".into()).is_retryable());
    }
}
