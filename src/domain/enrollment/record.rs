//! Enrollment record and its stored JSON form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{CourseId, EnrollmentId, Percentage};

/// A user's progress in one course.
///
/// `progress_percent` only moves up through [`Enrollment::raise_to`];
/// removal is the one operation that discards progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course_id: CourseId,
    pub progress_percent: Percentage,
}

impl Enrollment {
    /// A fresh enrollment at zero progress.
    pub fn new(course_id: CourseId) -> Self {
        Self {
            id: EnrollmentId::new(),
            course_id,
            progress_percent: Percentage::ZERO,
        }
    }

    pub fn with_progress(id: EnrollmentId, course_id: CourseId, progress: Percentage) -> Self {
        Self {
            id,
            course_id,
            progress_percent: progress,
        }
    }

    /// Raises progress to `max(current, target)`. Returns true if it moved.
    pub fn raise_to(&mut self, target: Percentage) -> bool {
        if target > self.progress_percent {
            self.progress_percent = target;
            true
        } else {
            false
        }
    }
}

/// Progress for one course as exchanged with the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: CourseId,
    #[serde(default)]
    pub progress_percent: Percentage,
}

impl CourseProgress {
    pub fn new(course_id: CourseId, progress_percent: Percentage) -> Self {
        Self {
            course_id,
            progress_percent,
        }
    }
}

impl From<&Enrollment> for CourseProgress {
    fn from(enrollment: &Enrollment) -> Self {
        Self::new(enrollment.course_id.clone(), enrollment.progress_percent)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEnrollment {
    #[serde(default)]
    id: Option<String>,
    course_id: CourseId,
    #[serde(default)]
    progress_percent: Option<Percentage>,
}

/// Parses a stored enrollment list.
///
/// Missing ids are derived from the course, missing progress reads as zero
/// and duplicate courses collapse into one record with the highest progress.
pub fn parse_enrollments(raw: &str) -> Result<Vec<Enrollment>, serde_json::Error> {
    let stored: Vec<StoredEnrollment> = serde_json::from_str(raw)?;
    let mut list: Vec<Enrollment> = Vec::with_capacity(stored.len());
    for entry in stored {
        let progress = entry.progress_percent.unwrap_or_default();
        if let Some(existing) = list.iter_mut().find(|e| e.course_id == entry.course_id) {
            existing.raise_to(progress);
            continue;
        }
        let id = entry
            .id
            .map(EnrollmentId::from_string)
            .unwrap_or_else(|| EnrollmentId::for_course(&entry.course_id));
        list.push(Enrollment::with_progress(id, entry.course_id, progress));
    }
    Ok(list)
}

/// Serialises a list in the stored JSON form.
pub fn serialize_enrollments(list: &[Enrollment]) -> Result<String, serde_json::Error> {
    serde_json::to_string(list)
}

/// Course to progress view of a list, ordered by course.
pub fn progress_by_course(list: &[Enrollment]) -> BTreeMap<CourseId, Percentage> {
    let mut map = BTreeMap::new();
    for e in list {
        let slot = map.entry(e.course_id.clone()).or_insert(Percentage::ZERO);
        *slot = (*slot).max(e.progress_percent);
    }
    map
}
