//! Human-readable recommendation derived from a preference vector.

use super::{Dimension, PreferenceVector};

/// Builds the study recommendation for the strongest dimension.
///
/// Pure and deterministic; ties go to the higher-priority dimension.
pub fn get_suggestion(vector: &PreferenceVector) -> String {
    let (top, value) = vector.top();
    let pct = value.round() as i64;
    match top {
        Dimension::Visual => format!("Prefer visuals ({}%): diagrams, charts, short videos.", pct),
        Dimension::Auditory => {
            format!("Prefer auditory ({}%): lectures, podcasts, explanations.", pct)
        }
        Dimension::Reading => {
            format!("Prefer reading ({}%): notes, articles, step-by-step guides.", pct)
        }
        Dimension::Kinesthetic => {
            format!("Prefer hands-on ({}%): coding exercises, labs, projects.", pct)
        }
    }
}
