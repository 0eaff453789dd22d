//! Learning DNA - the VARK learning-preference model.
//!
//! A four-dimensional bounded vector (visual, auditory, reading,
//! kinesthetic) nudged by activity signals, decayed across the other
//! dimensions and renormalised so the total never exceeds 100.

mod activity;
mod dimension;
mod suggestion;
mod vector;

pub use activity::{ActivityEffect, ActivityKind};
pub use dimension::Dimension;
pub use suggestion::get_suggestion;
pub use vector::{PreferenceVector, DECAY_PERCENT, MAX_NUDGE, MAX_TOTAL, MIN_NUDGE};
