//! Max-merge reconciliation between the local cache and the remote store.
//!
//! Progress only ever moves up, so taking the per-course maximum of both
//! sides can never lose progress recorded on either of them.

use std::collections::BTreeMap;

use super::record::{progress_by_course, CourseProgress, Enrollment};
use crate::domain::foundation::{CourseId, EnrollmentId, Percentage};

/// Per-course union of two progress maps, keeping the maximum.
///
/// Commutative: `merge_progress(a, b) == merge_progress(b, a)`.
pub fn merge_progress(
    a: &BTreeMap<CourseId, Percentage>,
    b: &BTreeMap<CourseId, Percentage>,
) -> BTreeMap<CourseId, Percentage> {
    let mut merged = a.clone();
    for (course, progress) in b {
        let slot = merged.entry(course.clone()).or_insert(Percentage::ZERO);
        *slot = (*slot).max(*progress);
    }
    merged
}

/// Course to progress view of a remote list; duplicates keep the maximum.
pub fn remote_progress(remote: &[CourseProgress]) -> BTreeMap<CourseId, Percentage> {
    let mut map = BTreeMap::new();
    for p in remote {
        let slot = map.entry(p.course_id.clone()).or_insert(Percentage::ZERO);
        *slot = (*slot).max(p.progress_percent);
    }
    map
}

/// Outcome of comparing a local list against the remote one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Union of both sides at max progress, ordered by course.
    pub merged: Vec<Enrollment>,
    /// Courses where local is ahead and the remote must be raised.
    pub pushes: Vec<CourseProgress>,
}

impl MergePlan {
    pub fn build(local: &[Enrollment], remote: &[CourseProgress]) -> Self {
        let local_map = progress_by_course(local);
        let remote_map = remote_progress(remote);

        let pushes = local_map
            .iter()
            .filter(|(course, progress)| {
                **progress > remote_map.get(*course).copied().unwrap_or_default()
            })
            .map(|(course, progress)| CourseProgress::new(course.clone(), *progress))
            .collect();

        let merged = merge_progress(&local_map, &remote_map)
            .into_iter()
            .map(|(course, progress)| {
                let id = local
                    .iter()
                    .find(|e| e.course_id == course)
                    .map(|e| e.id.clone())
                    .unwrap_or_else(|| EnrollmentId::for_course(&course));
                Enrollment::with_progress(id, course, progress)
            })
            .collect();

        Self { merged, pushes }
    }
}

/// Compares two lists by (course, progress), ignoring order and ids.
pub fn same_progress(a: &[Enrollment], b: &[Enrollment]) -> bool {
    a.len() == b.len() && progress_by_course(a) == progress_by_course(b)
}
