//! Dimension enum naming the four VARK learning-style axes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One axis of the learning-preference vector.
///
/// Declaration order is the tie-break priority when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
}

impl Dimension {
    /// Returns all dimensions in priority order.
    pub fn all() -> &'static [Dimension] {
        &[
            Dimension::Visual,
            Dimension::Auditory,
            Dimension::Reading,
            Dimension::Kinesthetic,
        ]
    }

    /// Returns the 0-based priority of this dimension.
    pub fn priority(&self) -> usize {
        match self {
            Dimension::Visual => 0,
            Dimension::Auditory => 1,
            Dimension::Reading => 2,
            Dimension::Kinesthetic => 3,
        }
    }

    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Visual => "visual",
            Dimension::Auditory => "auditory",
            Dimension::Reading => "reading",
            Dimension::Kinesthetic => "kinesthetic",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_priority_order() {
        for (idx, dim) in Dimension::all().iter().enumerate() {
            assert_eq!(dim.priority(), idx);
        }
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Dimension::Kinesthetic).unwrap();
        assert_eq!(json, "\"kinesthetic\"");
    }
}
