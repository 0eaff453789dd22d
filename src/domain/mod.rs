//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, identity, percentage, errors)
//! - `learning_dna` - VARK preference vector and activity signals
//! - `enrollment` - Enrollment records, max-merge reconciliation, change events
//! - `gamification` - Activity streaks, progress stats and badges

pub mod enrollment;
pub mod foundation;
pub mod gamification;
pub mod learning_dna;
