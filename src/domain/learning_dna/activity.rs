//! Behavioural signals that feed the preference vector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Dimension;
use crate::domain::foundation::ValidationError;

/// Share of the nudge a study session gives to reading and kinesthetic.
pub const STUDY_SESSION_MAJOR_SHARE: f64 = 0.6;

/// Share of the nudge a study session gives to visual and auditory.
pub const STUDY_SESSION_MINOR_SHARE: f64 = 0.3;

/// A learner activity reported by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
    StudySession,
    DiagramView,
    VideoWatch,
    PodcastListen,
    CodeRun,
}

/// How an activity moves the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEffect {
    /// Nudge one dimension and decay the other three.
    Targeted(Dimension),
    /// Balanced nudge across all dimensions, no decay.
    Balanced,
    /// Accepted but carries no signal.
    None,
}

impl ActivityKind {
    pub fn all() -> &'static [ActivityKind] {
        &[
            ActivityKind::Visual,
            ActivityKind::Auditory,
            ActivityKind::Reading,
            ActivityKind::Kinesthetic,
            ActivityKind::StudySession,
            ActivityKind::DiagramView,
            ActivityKind::VideoWatch,
            ActivityKind::PodcastListen,
            ActivityKind::CodeRun,
        ]
    }

    /// Maps the activity to its effect on the preference vector.
    pub fn effect(&self) -> ActivityEffect {
        match self {
            ActivityKind::Visual | ActivityKind::DiagramView => {
                ActivityEffect::Targeted(Dimension::Visual)
            }
            ActivityKind::Auditory | ActivityKind::PodcastListen => {
                ActivityEffect::Targeted(Dimension::Auditory)
            }
            ActivityKind::Reading => ActivityEffect::Targeted(Dimension::Reading),
            ActivityKind::Kinesthetic | ActivityKind::CodeRun => {
                ActivityEffect::Targeted(Dimension::Kinesthetic)
            }
            ActivityKind::StudySession => ActivityEffect::Balanced,
            // Video spans several styles, so it is not attributed to one.
            ActivityKind::VideoWatch => ActivityEffect::None,
        }
    }

    /// Returns the snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Visual => "visual",
            ActivityKind::Auditory => "auditory",
            ActivityKind::Reading => "reading",
            ActivityKind::Kinesthetic => "kinesthetic",
            ActivityKind::StudySession => "study_session",
            ActivityKind::DiagramView => "diagram_view",
            ActivityKind::VideoWatch => "video_watch",
            ActivityKind::PodcastListen => "podcast_listen",
            ActivityKind::CodeRun => "code_run",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("activity", format!("unknown kind '{}'", s))
            })
    }
}
