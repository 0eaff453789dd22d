//! In-memory remote enrollment store.
//!
//! Mirrors the server rule (one record per course, progress only rises) and
//! records every call so tests can assert on pushes and deletes. Can be
//! switched offline to simulate an unreachable server.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::enrollment::CourseProgress;
use crate::domain::foundation::{CourseId, Percentage};
use crate::ports::{RemoteEnrollmentStore, RemoteError};

#[derive(Debug, Default)]
struct RemoteState {
    records: BTreeMap<CourseId, Percentage>,
    upserts: Vec<CourseProgress>,
    deletes: Vec<CourseId>,
    list_calls: usize,
}

/// In-memory stand-in for the enrollment service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemoteStore {
    state: Arc<Mutex<RemoteState>>,
    offline: Arc<AtomicBool>,
    reject_upserts: Arc<AtomicBool>,
    upsert_delay: Option<Duration>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `records`.
    pub fn with_records<'a>(records: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for (course, progress) in records {
                if let Ok(course) = CourseId::new(course) {
                    state.records.insert(course, Percentage::new(progress));
                }
            }
        }
        store
    }

    /// Delays each upsert, so tests can interleave local writes with a sync.
    pub fn with_upsert_delay(mut self, delay: Duration) -> Self {
        self.upsert_delay = Some(delay);
        self
    }

    /// Makes every call fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes upserts fail while listing keeps working.
    pub fn set_reject_upserts(&self, reject: bool) {
        self.reject_upserts.store(reject, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// Current server-side progress for `course`.
    pub fn progress_of(&self, course: &str) -> Option<u8> {
        let course = CourseId::new(course).ok()?;
        self.with_state(|s| s.records.get(&course).map(|p| p.value()))
            .flatten()
    }

    /// Every upsert received, in arrival order.
    pub fn upserts(&self) -> Vec<CourseProgress> {
        self.with_state(|s| s.upserts.clone()).unwrap_or_default()
    }

    /// Every delete received, in arrival order.
    pub fn deletes(&self) -> Vec<CourseId> {
        self.with_state(|s| s.deletes.clone()).unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.with_state(|s| s.list_calls).unwrap_or(0)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut RemoteState) -> T) -> Option<T> {
        self.state.lock().ok().map(|mut s| f(&mut s))
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("remote store is offline".into()));
        }
        Ok(())
    }

    fn locked<T>(&self, f: impl FnOnce(&mut RemoteState) -> T) -> Result<T, RemoteError> {
        self.with_state(f)
            .ok_or_else(|| RemoteError::Unavailable("remote state lock poisoned".into()))
    }
}

#[async_trait]
impl RemoteEnrollmentStore for InMemoryRemoteStore {
    async fn list(&self) -> Result<Vec<CourseProgress>, RemoteError> {
        self.check_online()?;
        self.locked(|s| {
            s.list_calls += 1;
            s.records
                .iter()
                .map(|(c, p)| CourseProgress::new(c.clone(), *p))
                .collect()
        })
    }

    async fn upsert(
        &self,
        course_id: &CourseId,
        progress: Percentage,
    ) -> Result<CourseProgress, RemoteError> {
        if let Some(delay) = self.upsert_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        if self.reject_upserts.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("upsert rejected".into()));
        }
        self.locked(|s| {
            s.upserts.push(CourseProgress::new(course_id.clone(), progress));
            let slot = s.records.entry(course_id.clone()).or_insert(Percentage::ZERO);
            *slot = (*slot).max(progress);
            CourseProgress::new(course_id.clone(), *slot)
        })
    }

    async fn delete(&self, course_id: &CourseId) -> Result<(), RemoteError> {
        self.check_online()?;
        self.locked(|s| {
            s.deletes.push(course_id.clone());
            s.records.remove(course_id);
        })
    }
}
