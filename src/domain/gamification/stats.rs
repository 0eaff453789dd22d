//! Aggregate progress statistics over a user's enrollments.

use serde::Serialize;

use crate::domain::enrollment::Enrollment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EnrollmentStats {
    pub total_courses: usize,
    /// Rounded mean progress; zero with no enrollments.
    pub avg_progress: u8,
    pub max_progress: u8,
}

impl EnrollmentStats {
    pub fn from_enrollments(enrollments: &[Enrollment]) -> Self {
        let total_courses = enrollments.len();
        if total_courses == 0 {
            return Self::default();
        }
        let sum: u32 = enrollments
            .iter()
            .map(|e| u32::from(e.progress_percent.value()))
            .sum();
        let avg_progress = (f64::from(sum) / total_courses as f64).round() as u8;
        let max_progress = enrollments
            .iter()
            .map(|e| e.progress_percent.value())
            .max()
            .unwrap_or(0);
        Self {
            total_courses,
            avg_progress,
            max_progress,
        }
    }
}
