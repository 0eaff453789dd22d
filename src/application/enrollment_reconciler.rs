//! EnrollmentReconciler - local enrollment cache kept in step with the
//! server and with every other reconciler in the process.
//!
//! Local mutations are applied under one lock, persisted immediately and
//! broadcast on the change bus after the lock is released. Progress writes
//! go to the server fire-and-forget; `sync` reconciles the two sides with a
//! per-course max-merge so no progress recorded anywhere is lost.

use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinSet;

use crate::domain::enrollment::{
    parse_enrollments, same_progress, serialize_enrollments, ChangeReason, CourseProgress,
    Enrollment, EnrollmentsChanged, MergePlan,
};
use crate::domain::foundation::{CourseId, Identity, Percentage, ReconcilerId};
use crate::ports::{
    EnrollmentChangeBus, EnrollmentListener, KeyValueStore, RemoteEnrollmentStore, RemoteError,
    Subscription,
};

/// Storage key prefix; the identity namespace is appended.
pub const ENROLLMENTS_KEY_PREFIX: &str = "smartedu.enrollments";

/// Keys written by older clients, checked in order when the per-identity
/// key is empty.
pub const LEGACY_ENROLLMENT_KEYS: [&str; 2] = ["smartedu.enrollments", "smartedu.enrollments.guest"];

pub fn enrollments_storage_key(identity: &Identity) -> String {
    format!("{}.{}", ENROLLMENTS_KEY_PREFIX, identity.namespace())
}

/// Lifecycle of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Unloaded,
    Loaded,
    Syncing,
}

/// Why a sync pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotLoaded,
    NoRemote,
    Guest,
    AlreadySyncing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    /// The remote list could not be fetched; local state is untouched.
    RemoteUnavailable(RemoteError),
    /// Local already matched the merged view.
    Unchanged,
    /// Local was replaced by the merged view and broadcast.
    Updated,
}

/// What one `sync` pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Local-ahead courses successfully pushed to the server.
    pub pushed: usize,
    /// Pushes that failed; retried on the next pass.
    pub failed_pushes: usize,
}

impl SyncReport {
    fn new(outcome: SyncOutcome) -> Self {
        Self {
            outcome,
            pushed: 0,
            failed_pushes: 0,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Skipped(_))
    }
}

#[derive(Debug)]
struct Inner {
    state: ReconcilerState,
    enrollments: Vec<Enrollment>,
    /// Courses removed while a sync pass is running. The pass's remote
    /// snapshot predates the removal, so these are kept out of its merge.
    removed_during_sync: BTreeSet<CourseId>,
}

/// State shared with the bus listener.
struct Shared {
    id: ReconcilerId,
    key: String,
    inner: Mutex<Inner>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies broadcasts from other reconcilers on the same key.
struct ChangeListener {
    shared: Weak<Shared>,
}

impl EnrollmentListener for ChangeListener {
    fn on_enrollments_changed(&self, event: &EnrollmentsChanged) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if event.origin == shared.id || event.storage_key != shared.key {
            return;
        }
        shared.lock().enrollments = event.enrollments.clone();
        tracing::debug!(
            reconciler = %shared.id,
            origin = %event.origin,
            count = event.enrollments.len(),
            "applied enrollment change from another instance"
        );
    }
}

/// Stateful enrollment service for one identity.
pub struct EnrollmentReconciler {
    shared: Arc<Shared>,
    identity: Identity,
    store: Arc<dyn KeyValueStore>,
    bus: Arc<dyn EnrollmentChangeBus>,
    remote: Option<Arc<dyn RemoteEnrollmentStore>>,
    pending: Mutex<JoinSet<()>>,
    _subscription: Subscription,
}

impl EnrollmentReconciler {
    /// Creates an unloaded reconciler and subscribes it to `bus`.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        bus: Arc<dyn EnrollmentChangeBus>,
        remote: Option<Arc<dyn RemoteEnrollmentStore>>,
        identity: Identity,
    ) -> Self {
        let shared = Arc::new(Shared {
            id: ReconcilerId::new(),
            key: enrollments_storage_key(&identity),
            inner: Mutex::new(Inner {
                state: ReconcilerState::Unloaded,
                enrollments: Vec::new(),
                removed_during_sync: BTreeSet::new(),
            }),
        });
        let subscription = bus.subscribe(Arc::new(ChangeListener {
            shared: Arc::downgrade(&shared),
        }));

        Self {
            shared,
            identity,
            store,
            bus,
            remote,
            pending: Mutex::new(JoinSet::new()),
            _subscription: subscription,
        }
    }

    pub fn id(&self) -> ReconcilerId {
        self.shared.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn storage_key(&self) -> &str {
        &self.shared.key
    }

    pub fn state(&self) -> ReconcilerState {
        self.shared.lock().state
    }

    /// Snapshot of the in-memory list.
    pub fn enrollments(&self) -> Vec<Enrollment> {
        self.shared.lock().enrollments.clone()
    }

    pub fn is_enrolled(&self, course_id: &CourseId) -> bool {
        self.shared
            .lock()
            .enrollments
            .iter()
            .any(|e| &e.course_id == course_id)
    }

    /// Reads the stored list, migrating a legacy key on first use.
    pub fn load(&self) -> Vec<Enrollment> {
        let list = self.read_stored();
        let mut inner = self.shared.lock();
        inner.enrollments = list.clone();
        if inner.state == ReconcilerState::Unloaded {
            inner.state = ReconcilerState::Loaded;
        }
        tracing::debug!(key = %self.shared.key, count = list.len(), "loaded enrollments");
        list
    }

    /// Adds `course_id` at zero progress. Returns false if already enrolled.
    pub fn enroll(&self, course_id: &CourseId) -> bool {
        self.ensure_loaded();
        let snapshot = {
            let mut inner = self.shared.lock();
            if inner.enrollments.iter().any(|e| &e.course_id == course_id) {
                return false;
            }
            inner.enrollments.push(Enrollment::new(course_id.clone()));
            self.persist(&inner.enrollments);
            inner.enrollments.clone()
        };
        tracing::info!(course_id = %course_id, "enrolled");
        self.broadcast(ChangeReason::Enrolled, snapshot);
        true
    }

    /// Raises progress for `course_id` to `max(current, percent)`.
    ///
    /// `percent` is clamped to `[0, 100]` and rounded; NaN counts as 0.
    /// Unknown courses are ignored. Returns whether progress moved.
    pub fn update_progress(&self, course_id: &CourseId, percent: f64) -> bool {
        self.ensure_loaded();
        let target = Percentage::from_lossy(percent);
        let (snapshot, progress) = {
            let mut inner = self.shared.lock();
            let Some(enrollment) = inner
                .enrollments
                .iter_mut()
                .find(|e| &e.course_id == course_id)
            else {
                tracing::debug!(course_id = %course_id, "progress update for unknown course ignored");
                return false;
            };
            if !enrollment.raise_to(target) {
                return false;
            }
            let progress = enrollment.progress_percent;
            self.persist(&inner.enrollments);
            (inner.enrollments.clone(), progress)
        };

        tracing::debug!(course_id = %course_id, progress = progress.value(), "progress raised");
        self.broadcast(ChangeReason::ProgressUpdated, snapshot);
        self.spawn_upsert(course_id.clone(), progress);
        true
    }

    /// Removes `course_id` locally and asks the server to forget it.
    ///
    /// Returns whether a local record existed.
    pub fn remove_enrollment(&self, course_id: &CourseId) -> bool {
        self.ensure_loaded();
        let (snapshot, removed) = {
            let mut inner = self.shared.lock();
            let before = inner.enrollments.len();
            inner.enrollments.retain(|e| &e.course_id != course_id);
            let removed = inner.enrollments.len() != before;
            if inner.state == ReconcilerState::Syncing {
                inner.removed_during_sync.insert(course_id.clone());
            }
            self.persist(&inner.enrollments);
            (inner.enrollments.clone(), removed)
        };

        tracing::info!(course_id = %course_id, removed, "enrollment removed");
        self.broadcast(ChangeReason::Removed, snapshot);
        self.spawn_delete(course_id.clone());
        removed
    }

    /// Applies a change made to the storage key by another process.
    ///
    /// `new_value` of `None` means the key was deleted. Nothing is persisted
    /// or broadcast. Returns whether the in-memory list was replaced.
    pub fn apply_storage_change(&self, key: &str, new_value: Option<&str>) -> bool {
        if key != self.shared.key {
            return false;
        }
        let list = match new_value {
            None => Vec::new(),
            Some(raw) => match parse_enrollments(raw) {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(key, "ignoring unreadable storage change: {}", e);
                    return false;
                }
            },
        };
        self.shared.lock().enrollments = list;
        true
    }

    /// Reconciles the local list with the server.
    ///
    /// Never fails; the report says what happened.
    pub async fn sync(&self) -> SyncReport {
        let Some(remote) = self.remote.clone() else {
            return SyncReport::new(SyncOutcome::Skipped(SkipReason::NoRemote));
        };
        if !self.identity.is_authenticated() {
            return SyncReport::new(SyncOutcome::Skipped(SkipReason::Guest));
        }

        {
            let mut inner = self.shared.lock();
            let state = inner.state;
            match state {
                ReconcilerState::Unloaded => {
                    return SyncReport::new(SyncOutcome::Skipped(SkipReason::NotLoaded))
                }
                ReconcilerState::Syncing => {
                    return SyncReport::new(SyncOutcome::Skipped(SkipReason::AlreadySyncing))
                }
                ReconcilerState::Loaded => {
                    inner.state = ReconcilerState::Syncing;
                    inner.removed_during_sync.clear();
                }
            }
        }
        let _guard = SyncingGuard {
            shared: &self.shared,
        };

        // Outstanding writes must land before the remote list is read.
        self.flush().await;
        let local = self.enrollments();

        let fetched = match remote.list().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(key = %self.shared.key, "enrollment sync skipped, remote unavailable: {}", e);
                return SyncReport::new(SyncOutcome::RemoteUnavailable(e));
            }
        };
        let remote_list = self.without_removed(fetched);

        let plan = MergePlan::build(&local, &remote_list);
        let (pushed, failed_pushes) = push_all(remote.as_ref(), &plan.pushes).await;

        // Re-merge against the list as it is now, so progress recorded
        // while the pass was in flight survives and removals stay removed.
        let (changed, removed) = {
            let mut inner = self.shared.lock();
            let removed = std::mem::take(&mut inner.removed_during_sync);
            let current: Vec<CourseProgress> = remote_list
                .iter()
                .filter(|p| !removed.contains(&p.course_id))
                .cloned()
                .collect();
            let merged = MergePlan::build(&inner.enrollments, &current).merged;
            let changed = if same_progress(&inner.enrollments, &merged) {
                None
            } else {
                inner.enrollments = merged;
                self.persist(&inner.enrollments);
                Some(inner.enrollments.clone())
            };
            (changed, removed)
        };

        // A push may have landed after the removal's delete; delete again.
        for push in plan.pushes.iter().filter(|p| removed.contains(&p.course_id)) {
            self.spawn_delete(push.course_id.clone());
        }

        let outcome = match changed {
            Some(snapshot) => {
                self.broadcast(ChangeReason::Reconciled, snapshot);
                SyncOutcome::Updated
            }
            None => SyncOutcome::Unchanged,
        };
        tracing::info!(
            key = %self.shared.key,
            remote = remote_list.len(),
            pushed,
            failed_pushes,
            updated = outcome == SyncOutcome::Updated,
            "enrollment sync finished"
        );

        SyncReport {
            outcome,
            pushed,
            failed_pushes,
        }
    }

    /// Waits for every fire-and-forget remote write started so far.
    pub async fn flush(&self) {
        let mut tasks = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *pending, JoinSet::new())
        };
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("remote enrollment write task failed: {}", e);
            }
        }
    }

    // === Internals ===

    fn without_removed(&self, list: Vec<CourseProgress>) -> Vec<CourseProgress> {
        let inner = self.shared.lock();
        list.into_iter()
            .filter(|p| !inner.removed_during_sync.contains(&p.course_id))
            .collect()
    }

    fn ensure_loaded(&self) {
        if self.state() == ReconcilerState::Unloaded {
            self.load();
        }
    }

    fn read_stored(&self) -> Vec<Enrollment> {
        let key = &self.shared.key;
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => self.migrate_legacy(),
            Err(e) => {
                tracing::warn!(key = %key, "failed to read enrollments: {}", e);
                None
            }
        };

        match raw.map(|raw| parse_enrollments(&raw)) {
            Some(Ok(list)) => list,
            Some(Err(e)) => {
                tracing::warn!(key = %key, "discarding unreadable enrollments: {}", e);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Copies the first present legacy value forward to the current key.
    fn migrate_legacy(&self) -> Option<String> {
        let key = &self.shared.key;
        for legacy in LEGACY_ENROLLMENT_KEYS.iter().filter(|k| **k != key.as_str()) {
            match self.store.get(legacy) {
                Ok(Some(raw)) => {
                    if let Err(e) = self.store.set(key, &raw) {
                        tracing::warn!(key = %key, "failed to migrate legacy enrollments: {}", e);
                    } else {
                        tracing::info!(from = legacy, to = %key, "migrated legacy enrollments");
                    }
                    return Some(raw);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(key = legacy, "failed to read legacy enrollments: {}", e),
            }
        }
        None
    }

    fn persist(&self, list: &[Enrollment]) {
        let key = &self.shared.key;
        let result = serialize_enrollments(list)
            .map_err(|e| e.to_string())
            .and_then(|json| self.store.set(key, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::warn!(key = %key, "failed to persist enrollments: {}", e);
        }
    }

    fn broadcast(&self, reason: ChangeReason, enrollments: Vec<Enrollment>) {
        let event =
            EnrollmentsChanged::new(self.shared.key.clone(), self.shared.id, reason, enrollments);
        self.bus.publish(&event);
    }

    fn remote_writer(&self) -> Option<Arc<dyn RemoteEnrollmentStore>> {
        if self.identity.is_authenticated() {
            self.remote.clone()
        } else {
            None
        }
    }

    fn spawn_upsert(&self, course_id: CourseId, progress: Percentage) {
        let Some(remote) = self.remote_writer() else {
            return;
        };
        self.spawn_remote_write(async move {
            match remote.upsert(&course_id, progress).await {
                Ok(stored) => tracing::debug!(
                    course_id = %course_id,
                    stored = stored.progress_percent.value(),
                    "remote progress updated"
                ),
                Err(e) => tracing::warn!(course_id = %course_id, "remote progress update failed: {}", e),
            }
        });
    }

    fn spawn_delete(&self, course_id: CourseId) {
        let Some(remote) = self.remote_writer() else {
            return;
        };
        self.spawn_remote_write(async move {
            if let Err(e) = remote.delete(&course_id).await {
                tracing::warn!(course_id = %course_id, "remote enrollment delete failed: {}", e);
            }
        });
    }

    fn spawn_remote_write<F>(&self, write: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                pending.spawn_on(write, &handle);
            }
            Err(_) => tracing::debug!("no async runtime, remote enrollment write skipped"),
        }
    }
}

impl Drop for EnrollmentReconciler {
    fn drop(&mut self) {
        // Writes already started should still reach the server.
        if let Ok(pending) = self.pending.get_mut() {
            pending.detach_all();
        }
    }
}

/// Returns the reconciler to `Loaded` however the sync pass ends.
struct SyncingGuard<'a> {
    shared: &'a Shared,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        if inner.state == ReconcilerState::Syncing {
            inner.state = ReconcilerState::Loaded;
        }
    }
}

/// Pushes every entry concurrently; returns (succeeded, failed).
async fn push_all(remote: &dyn RemoteEnrollmentStore, pushes: &[CourseProgress]) -> (usize, usize) {
    let results = join_all(
        pushes
            .iter()
            .map(|p| remote.upsert(&p.course_id, p.progress_percent)),
    )
    .await;

    let mut failed = 0;
    for (push, result) in pushes.iter().zip(results) {
        if let Err(e) = result {
            failed += 1;
            tracing::warn!(
                course_id = %push.course_id,
                progress = push.progress_percent.value(),
                "failed to push local progress: {}",
                e
            );
        }
    }
    (pushes.len() - failed, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryChangeBus, InMemoryKeyValueStore, InMemoryRemoteStore};
    use crate::domain::foundation::UserId;

    // =========================================================================
    // Helpers
    // =========================================================================

    struct Fixture {
        store: InMemoryKeyValueStore,
        bus: Arc<InMemoryChangeBus>,
        remote: InMemoryRemoteStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: InMemoryKeyValueStore::new(),
                bus: Arc::new(InMemoryChangeBus::new()),
                remote: InMemoryRemoteStore::new(),
            }
        }

        fn reconciler(&self, identity: Identity) -> EnrollmentReconciler {
            EnrollmentReconciler::new(
                Arc::new(self.store.clone()),
                self.bus.clone(),
                Some(Arc::new(self.remote.clone())),
                identity,
            )
        }

        fn user(&self) -> EnrollmentReconciler {
            self.reconciler(user("u1"))
        }
    }

    fn user(id: &str) -> Identity {
        Identity::User(UserId::new(id).unwrap())
    }

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn progress(r: &EnrollmentReconciler) -> Vec<(String, u8)> {
        let mut list: Vec<(String, u8)> = r
            .enrollments()
            .iter()
            .map(|e| (e.course_id.to_string(), e.progress_percent.value()))
            .collect();
        list.sort();
        list
    }

    // =========================================================================
    // Load and migration
    // =========================================================================

    #[test]
    fn starts_unloaded_and_loads_empty() {
        let fx = Fixture::new();
        let r = fx.user();
        assert_eq!(r.state(), ReconcilerState::Unloaded);
        assert!(r.load().is_empty());
        assert_eq!(r.state(), ReconcilerState::Loaded);
        assert_eq!(r.storage_key(), "smartedu.enrollments.u1");
    }

    #[test]
    fn legacy_key_is_copied_forward() {
        let fx = Fixture::new();
        fx.store
            .set("smartedu.enrollments", r#"[{"id":"e1","courseId":"c1","progressPercent":30}]"#)
            .unwrap();
        fx.store
            .set("smartedu.enrollments.guest", r#"[{"courseId":"ignored"}]"#)
            .unwrap();

        let r = fx.user();
        let list = r.load();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "e1");
        assert!(fx.store.get("smartedu.enrollments.u1").unwrap().is_some());
    }

    #[test]
    fn guest_key_is_the_fallback_legacy_source() {
        let fx = Fixture::new();
        fx.store
            .set("smartedu.enrollments.guest", r#"[{"courseId":"c7","progressPercent":5}]"#)
            .unwrap();
        let r = fx.user();
        assert_eq!(r.load().len(), 1);
        assert!(r.is_enrolled(&course("c7")));
    }

    #[test]
    fn corrupt_data_loads_as_empty() {
        let fx = Fixture::new();
        fx.store.set("smartedu.enrollments.u1", "{{{").unwrap();
        let r = fx.user();
        assert!(r.load().is_empty());
        assert_eq!(r.state(), ReconcilerState::Loaded);
    }

    // =========================================================================
    // Local mutations
    // =========================================================================

    #[test]
    fn enroll_is_idempotent_and_broadcasts_once() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();

        assert!(r.enroll(&course("c1")));
        assert!(!r.enroll(&course("c1")));

        assert_eq!(r.enrollments().len(), 1);
        assert_eq!(fx.bus.event_count(), 1);
        assert_eq!(fx.bus.published_events()[0].reason, ChangeReason::Enrolled);
    }

    #[test]
    fn mutations_before_load_read_storage_first() {
        let fx = Fixture::new();
        fx.store
            .set("smartedu.enrollments.guest", r#"[{"courseId":"c1","progressPercent":10}]"#)
            .unwrap();
        let r = fx.reconciler(Identity::Guest);

        assert!(r.enroll(&course("c2")));
        assert_eq!(progress(&r), vec![("c1".into(), 10), ("c2".into(), 0)]);
    }

    #[test]
    fn progress_only_moves_up() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();
        r.enroll(&course("c1"));

        assert!(r.update_progress(&course("c1"), 40.0));
        assert!(!r.update_progress(&course("c1"), 20.0));
        assert!(r.update_progress(&course("c1"), 250.0));
        assert!(!r.update_progress(&course("c1"), f64::NAN));

        assert_eq!(progress(&r), vec![("c1".into(), 100)]);
    }

    #[test]
    fn progress_for_unknown_course_is_ignored() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();
        assert!(!r.update_progress(&course("nope"), 50.0));
        assert!(r.enrollments().is_empty());
        assert_eq!(fx.bus.event_count(), 0);
    }

    #[test]
    fn remove_persists_and_reports() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();
        r.enroll(&course("c1"));

        assert!(r.remove_enrollment(&course("c1")));
        assert!(!r.remove_enrollment(&course("c1")));
        assert!(!r.is_enrolled(&course("c1")));
        assert_eq!(
            fx.store.get("smartedu.enrollments.guest").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn guest_mutations_never_touch_the_remote() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();
        r.enroll(&course("c1"));
        r.update_progress(&course("c1"), 10.0);
        r.remove_enrollment(&course("c1"));
        assert!(fx.remote.upserts().is_empty());
        assert!(fx.remote.deletes().is_empty());
    }

    #[test]
    fn without_runtime_remote_writes_are_skipped() {
        let fx = Fixture::new();
        let r = fx.user();
        r.load();
        r.enroll(&course("c1"));
        assert!(r.update_progress(&course("c1"), 10.0));
        assert!(fx.remote.upserts().is_empty());
    }

    // =========================================================================
    // Broadcast and storage events
    // =========================================================================

    #[test]
    fn other_instances_see_changes_without_reload() {
        let fx = Fixture::new();
        let a = fx.reconciler(Identity::Guest);
        let b = fx.reconciler(Identity::Guest);
        a.load();
        b.load();

        a.enroll(&course("c1"));
        a.update_progress(&course("c1"), 35.0);

        assert_eq!(progress(&b), vec![("c1".into(), 35)]);
    }

    #[test]
    fn changes_for_other_identities_are_ignored() {
        let fx = Fixture::new();
        let guest = fx.reconciler(Identity::Guest);
        let u1 = fx.user();
        guest.load();
        u1.load();

        guest.enroll(&course("c1"));
        assert!(u1.enrollments().is_empty());
    }

    #[test]
    fn dropped_instance_unsubscribes() {
        let fx = Fixture::new();
        let a = fx.reconciler(Identity::Guest);
        assert_eq!(fx.bus.subscriber_count(), 1);
        drop(a);
        assert_eq!(fx.bus.subscriber_count(), 0);
    }

    #[test]
    fn storage_change_replaces_without_rebroadcast() {
        let fx = Fixture::new();
        let r = fx.reconciler(Identity::Guest);
        r.load();

        assert!(r.apply_storage_change(
            "smartedu.enrollments.guest",
            Some(r#"[{"courseId":"c9","progressPercent":60}]"#)
        ));
        assert!(!r.apply_storage_change("smartedu:dna:guest", Some("{}")));
        assert!(!r.apply_storage_change("smartedu.enrollments.guest", Some("garbage")));

        assert_eq!(progress(&r), vec![("c9".into(), 60)]);
        assert_eq!(fx.bus.event_count(), 0);
        assert_eq!(fx.store.get("smartedu.enrollments.guest").unwrap(), None);

        assert!(r.apply_storage_change("smartedu.enrollments.guest", None));
        assert!(r.enrollments().is_empty());
    }

    // =========================================================================
    // Remote writes and sync
    // =========================================================================

    #[tokio::test]
    async fn progress_is_pushed_fire_and_forget() {
        let fx = Fixture::new();
        let r = fx.user();
        r.load();
        r.enroll(&course("c1"));
        r.update_progress(&course("c1"), 45.0);
        r.flush().await;

        assert_eq!(fx.remote.progress_of("c1"), Some(45));
    }

    #[tokio::test]
    async fn remove_propagates_delete() {
        let fx = Fixture::new();
        let r = fx.user();
        r.load();
        r.enroll(&course("c1"));
        r.update_progress(&course("c1"), 5.0);
        r.remove_enrollment(&course("c1"));
        r.flush().await;

        assert_eq!(fx.remote.deletes(), vec![course("c1")]);
        assert_eq!(fx.remote.progress_of("c1"), None);
    }

    #[tokio::test]
    async fn sync_skips_when_not_applicable() {
        let fx = Fixture::new();

        let unloaded = fx.user();
        assert_eq!(
            unloaded.sync().await.outcome,
            SyncOutcome::Skipped(SkipReason::NotLoaded)
        );

        let guest = fx.reconciler(Identity::Guest);
        guest.load();
        assert_eq!(guest.sync().await.outcome, SyncOutcome::Skipped(SkipReason::Guest));

        let offline = EnrollmentReconciler::new(
            Arc::new(fx.store.clone()),
            fx.bus.clone(),
            None,
            user("u2"),
        );
        offline.load();
        assert_eq!(offline.sync().await.outcome, SyncOutcome::Skipped(SkipReason::NoRemote));
        assert_eq!(fx.remote.list_calls(), 0);
    }

    #[tokio::test]
    async fn sync_merges_both_sides_and_pushes_local_ahead() {
        let fx = Fixture::new();
        fx.store
            .set("smartedu.enrollments.u1", r#"[{"id":"l1","courseId":"c1","progressPercent":40}]"#)
            .unwrap();
        let remote = InMemoryRemoteStore::with_records([("c1", 20), ("c2", 10)]);
        let r = EnrollmentReconciler::new(
            Arc::new(fx.store.clone()),
            fx.bus.clone(),
            Some(Arc::new(remote.clone())),
            user("u1"),
        );
        r.load();

        let report = r.sync().await;

        assert_eq!(report.outcome, SyncOutcome::Updated);
        assert_eq!(report.pushed, 1);
        assert_eq!(progress(&r), vec![("c1".into(), 40), ("c2".into(), 10)]);
        assert_eq!(remote.upserts().len(), 1);
        assert_eq!(remote.progress_of("c1"), Some(40));
        assert_eq!(r.state(), ReconcilerState::Loaded);
        assert_eq!(
            fx.bus.published_events().last().map(|e| e.reason),
            Some(ChangeReason::Reconciled)
        );
    }

    #[tokio::test]
    async fn second_sync_is_unchanged() {
        let fx = Fixture::new();
        let r = fx.user();
        r.load();
        r.enroll(&course("c1"));
        r.update_progress(&course("c1"), 15.0);

        r.sync().await;
        let events = fx.bus.event_count();
        let report = r.sync().await;

        assert_eq!(report.outcome, SyncOutcome::Unchanged);
        assert_eq!(report.pushed, 0);
        assert_eq!(fx.bus.event_count(), events);
    }

    #[tokio::test]
    async fn remote_outage_leaves_local_untouched() {
        let fx = Fixture::new();
        let r = fx.user();
        r.load();
        r.enroll(&course("c1"));
        fx.remote.set_offline(true);

        let report = r.sync().await;

        assert!(matches!(report.outcome, SyncOutcome::RemoteUnavailable(_)));
        assert_eq!(progress(&r), vec![("c1".into(), 0)]);
        assert_eq!(r.state(), ReconcilerState::Loaded);
    }

    #[tokio::test]
    async fn failed_pushes_are_counted() {
        let fx = Fixture::new();
        fx.store
            .set("smartedu.enrollments.u1", r#"[{"courseId":"c1","progressPercent":70}]"#)
            .unwrap();
        fx.remote.set_reject_upserts(true);
        let r = fx.user();
        r.load();

        let report = r.sync().await;

        assert_eq!(report.pushed, 0);
        assert_eq!(report.failed_pushes, 1);
        assert_eq!(report.outcome, SyncOutcome::Unchanged);
    }
}
