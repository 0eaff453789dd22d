//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the SmartEdu domain.

mod errors;
mod identity;
mod ids;
mod percentage;

pub use errors::ValidationError;
pub use identity::Identity;
pub use ids::{CourseId, EnrollmentId, ReconcilerId, UserId};
pub use percentage::Percentage;
