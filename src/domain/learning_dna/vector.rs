//! The bounded four-dimensional learning-preference vector.

use serde::{Deserialize, Serialize};

use super::{ActivityEffect, ActivityKind, Dimension};
use super::activity::{STUDY_SESSION_MAJOR_SHARE, STUDY_SESSION_MINOR_SHARE};

/// Upper bound for a single component and for the sum of all four.
pub const MAX_TOTAL: f64 = 100.0;

/// Smallest and largest nudge a single activity may apply.
pub const MIN_NUDGE: f64 = 0.5;
pub const MAX_NUDGE: f64 = 5.0;

/// Percentage by which untargeted dimensions shrink on a targeted update.
pub const DECAY_PERCENT: f64 = 0.25;

/// Inferred affinity for each learning style, percentage-like weights.
///
/// A vector produced by [`PreferenceVector::normalized`] has integral
/// components in `[0, 100]` whose sum is at most 100. The raw
/// [`PreferenceVector::DEFAULT`] is the one value that does not satisfy
/// this (it sums to 160).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceVector {
    pub visual: f64,
    pub auditory: f64,
    pub reading: f64,
    pub kinesthetic: f64,
}

impl PreferenceVector {
    pub const DEFAULT: Self = Self {
        visual: 60.0,
        auditory: 30.0,
        reading: 40.0,
        kinesthetic: 30.0,
    };

    pub fn new(visual: f64, auditory: f64, reading: f64, kinesthetic: f64) -> Self {
        Self {
            visual,
            auditory,
            reading,
            kinesthetic,
        }
    }

    /// Returns the component for a dimension.
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Visual => self.visual,
            Dimension::Auditory => self.auditory,
            Dimension::Reading => self.reading,
            Dimension::Kinesthetic => self.kinesthetic,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Visual => &mut self.visual,
            Dimension::Auditory => &mut self.auditory,
            Dimension::Reading => &mut self.reading,
            Dimension::Kinesthetic => &mut self.kinesthetic,
        }
    }

    pub fn sum(&self) -> f64 {
        self.visual + self.auditory + self.reading + self.kinesthetic
    }

    fn to_array(self) -> [f64; 4] {
        [self.visual, self.auditory, self.reading, self.kinesthetic]
    }

    fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// True when every component is an integer in range and the sum is at
    /// most 100.
    pub fn is_normalized(&self) -> bool {
        self.to_array()
            .iter()
            .all(|v| v.fract() == 0.0 && (0.0..=MAX_TOTAL).contains(v))
            && self.sum() <= MAX_TOTAL
    }

    /// Clamps, rounds and, when the total exceeds 100, scales every
    /// component down proportionally.
    pub fn normalized(&self) -> Self {
        let rounded = self.to_array().map(round_clamp);
        let total: f64 = rounded.iter().sum();
        if total <= MAX_TOTAL {
            return Self::from_array(rounded);
        }

        let scale = MAX_TOTAL / total;
        let scaled = rounded.map(|v| v * scale);
        let mut result = scaled.map(f64::round);

        // Independent rounding can overshoot by up to two points; take them
        // back from whichever components were rounded up the most.
        let mut excess = result.iter().sum::<f64>() - MAX_TOTAL;
        while excess > 0.0 {
            let idx = (1..result.len()).fold(0, |best, i| {
                if result[i] - scaled[i] > result[best] - scaled[best] {
                    i
                } else {
                    best
                }
            });
            result[idx] -= 1.0;
            excess -= 1.0;
        }

        Self::from_array(result)
    }

    /// Applies one activity signal. The result is not normalized.
    ///
    /// `weight` is an intensity or duration factor, clamped to
    /// `[0.5, 5]`; a NaN weight counts as 1.
    pub fn apply_activity(&self, kind: ActivityKind, weight: f64) -> Self {
        let nudge = nudge_for(weight);
        let mut next = *self;

        match kind.effect() {
            ActivityEffect::Targeted(primary) => {
                let decay = 1.0 - DECAY_PERCENT / 100.0;
                for dim in Dimension::all() {
                    let value = next.get_mut(*dim);
                    if *dim == primary {
                        *value += nudge;
                    } else {
                        *value *= decay;
                    }
                }
            }
            ActivityEffect::Balanced => {
                next.reading += nudge * STUDY_SESSION_MAJOR_SHARE;
                next.kinesthetic += nudge * STUDY_SESSION_MAJOR_SHARE;
                next.visual += nudge * STUDY_SESSION_MINOR_SHARE;
                next.auditory += nudge * STUDY_SESSION_MINOR_SHARE;
            }
            ActivityEffect::None => {}
        }

        next
    }

    /// Dimensions ordered by value, highest first; ties keep priority order.
    pub fn ranked(&self) -> Vec<(Dimension, f64)> {
        let mut entries: Vec<(Dimension, f64)> = Dimension::all()
            .iter()
            .map(|dim| (*dim, self.get(*dim)))
            .collect();
        // Stable sort, so equal values stay in declaration order.
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
    }

    /// The strongest dimension and its value.
    pub fn top(&self) -> (Dimension, f64) {
        self.ranked()[0]
    }

    /// Parses a stored vector. Missing or null fields fall back to the
    /// defaults; anything that is not a JSON object of numbers is an error.
    pub fn from_stored_json(raw: &str) -> Result<Self, serde_json::Error> {
        let stored: StoredVector = serde_json::from_str(raw)?;
        let d = Self::DEFAULT;
        Ok(Self::new(
            stored.visual.unwrap_or(d.visual),
            stored.auditory.unwrap_or(d.auditory),
            stored.reading.unwrap_or(d.reading),
            stored.kinesthetic.unwrap_or(d.kinesthetic),
        ))
    }
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Deserialize)]
struct StoredVector {
    #[serde(default)]
    visual: Option<f64>,
    #[serde(default)]
    auditory: Option<f64>,
    #[serde(default)]
    reading: Option<f64>,
    #[serde(default)]
    kinesthetic: Option<f64>,
}

fn round_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.round().clamp(0.0, MAX_TOTAL)
}

fn nudge_for(weight: f64) -> f64 {
    if weight.is_nan() {
        return 1.0;
    }
    weight.clamp(MIN_NUDGE, MAX_NUDGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_is_the_documented_exception() {
        let d = PreferenceVector::default();
        assert_eq!(d.sum(), 160.0);
        assert!(!d.is_normalized());
    }

    #[test]
    fn small_vectors_are_only_rounded() {
        let v = PreferenceVector::new(10.4, 20.5, 30.0, 5.49).normalized();
        assert_eq!(v, PreferenceVector::new(10.0, 21.0, 30.0, 5.0));
    }

    #[test]
    fn components_are_clamped_before_summing() {
        let v = PreferenceVector::new(-20.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(v, PreferenceVector::new(0.0, 0.0, 0.0, 0.0));
        let v = PreferenceVector::new(250.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(v, PreferenceVector::new(100.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn oversized_vectors_scale_down_proportionally() {
        let v = PreferenceVector::new(100.0, 100.0, 0.0, 0.0).normalized();
        assert_eq!(v, PreferenceVector::new(50.0, 50.0, 0.0, 0.0));
    }

    #[test]
    fn rounding_overshoot_is_trimmed() {
        // 3/109*100 = 2.75 rounds up three times, 91.74 rounds up to 92.
        let v = PreferenceVector::new(3.0, 3.0, 3.0, 100.0).normalized();
        assert_eq!(v.sum(), 100.0);
        assert!(v.is_normalized());

        let d = PreferenceVector::DEFAULT.normalized();
        assert_eq!(d, PreferenceVector::new(37.0, 19.0, 25.0, 19.0));
    }

    #[test]
    fn non_finite_components_are_coerced() {
        let v = PreferenceVector::new(f64::NAN, f64::INFINITY, 0.0, f64::NEG_INFINITY).normalized();
        assert_eq!(v, PreferenceVector::new(0.0, 100.0, 0.0, 0.0));
    }

    #[test]
    fn targeted_update_nudges_and_decays_independently() {
        let next = PreferenceVector::DEFAULT.apply_activity(ActivityKind::Kinesthetic, 5.0);
        assert!(approx(next.kinesthetic, 35.0));
        assert!(approx(next.visual, 59.85));
        assert!(approx(next.auditory, 29.925));
        assert!(approx(next.reading, 39.9));
    }

    #[test]
    fn nudge_is_clamped() {
        let base = PreferenceVector::new(0.0, 0.0, 0.0, 0.0);
        assert!(approx(base.apply_activity(ActivityKind::Reading, 50.0).reading, 5.0));
        assert!(approx(base.apply_activity(ActivityKind::Reading, 0.0).reading, 0.5));
        assert!(approx(base.apply_activity(ActivityKind::Reading, f64::NAN).reading, 1.0));
    }

    #[test]
    fn study_session_is_balanced_without_decay() {
        let next = PreferenceVector::DEFAULT.apply_activity(ActivityKind::StudySession, 2.0);
        assert!(approx(next.reading, 41.2));
        assert!(approx(next.kinesthetic, 31.2));
        assert!(approx(next.visual, 60.6));
        assert!(approx(next.auditory, 30.6));
    }

    #[test]
    fn video_watch_leaves_vector_untouched() {
        let base = PreferenceVector::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(base.apply_activity(ActivityKind::VideoWatch, 5.0), base);
    }

    #[test]
    fn ranked_breaks_ties_by_priority() {
        let v = PreferenceVector::new(50.0, 50.0, 0.0, 0.0);
        let ranked = v.ranked();
        assert_eq!(ranked[0].0, Dimension::Visual);
        assert_eq!(ranked[1].0, Dimension::Auditory);
        assert_eq!(ranked[2].0, Dimension::Reading);

        let v = PreferenceVector::new(10.0, 10.0, 10.0, 30.0);
        assert_eq!(v.top(), (Dimension::Kinesthetic, 30.0));
    }

    #[test]
    fn stored_json_fills_missing_fields_from_defaults() {
        let v = PreferenceVector::from_stored_json(r#"{"visual":12,"reading":null}"#).unwrap();
        assert_eq!(v, PreferenceVector::new(12.0, 30.0, 40.0, 30.0));
    }

    #[test]
    fn stored_json_rejects_garbage() {
        assert!(PreferenceVector::from_stored_json("not json").is_err());
        assert!(PreferenceVector::from_stored_json(r#"{"visual":"high"}"#).is_err());
    }

    proptest! {
        #[test]
        fn normalization_invariant_holds_for_all_reals(
            v in proptest::num::f64::ANY,
            a in proptest::num::f64::ANY,
            r in proptest::num::f64::ANY,
            k in proptest::num::f64::ANY,
        ) {
            let n = PreferenceVector::new(v, a, r, k).normalized();
            prop_assert!(n.is_normalized(), "{:?} -> {:?}", (v, a, r, k), n);
        }

        #[test]
        fn normalization_is_idempotent(
            v in -50.0f64..500.0,
            a in -50.0f64..500.0,
            r in -50.0f64..500.0,
            k in -50.0f64..500.0,
        ) {
            let once = PreferenceVector::new(v, a, r, k).normalized();
            prop_assert_eq!(once.normalized(), once);
        }
    }
}
