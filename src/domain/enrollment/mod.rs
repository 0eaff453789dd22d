//! Enrollment module - course progress records and their reconciliation.
//!
//! - `record` - the enrollment record and its stored JSON form
//! - `merge` - max-merge plan between local cache and remote store
//! - `events` - change notification published after local mutations

mod events;
mod merge;
mod record;

pub use events::{ChangeReason, EnrollmentsChanged, ENROLLMENTS_CHANGED};
pub use merge::{merge_progress, remote_progress, same_progress, MergePlan};
pub use record::{
    parse_enrollments, progress_by_course, serialize_enrollments, CourseProgress, Enrollment,
};
