//! In-memory enrollment change bus.
//!
//! Synchronous, deterministic delivery to every subscriber in the process.
//! Listeners are called after the registry lock is released, so a listener
//! may subscribe or drop its own subscription while handling an event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::domain::enrollment::EnrollmentsChanged;
use crate::ports::{EnrollmentChangeBus, EnrollmentListener, Subscription};

type Registry = RwLock<Vec<(u64, Arc<dyn EnrollmentListener>)>>;

/// Process-local change bus.
///
/// Also records published events for assertions.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryChangeBus::new());
/// let _sub = bus.subscribe(listener);
/// bus.publish(&event);
/// assert_eq!(bus.event_count(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryChangeBus {
    listeners: Arc<Registry>,
    next_id: AtomicU64,
    published: RwLock<Vec<EnrollmentsChanged>>,
}

impl InMemoryChangeBus {
    /// Creates a new bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<EnrollmentsChanged> {
        self.published
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Clears recorded events (for test isolation).
    pub fn clear(&self) {
        if let Ok(mut published) = self.published.write() {
            published.clear();
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn EnrollmentListener>> {
        match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, l)| l.clone()).collect(),
            Err(e) => {
                tracing::warn!("InMemoryChangeBus: listener registry poisoned: {}", e);
                Vec::new()
            }
        }
    }
}

fn unregister(registry: &Weak<Registry>, id: u64) {
    if let Some(registry) = registry.upgrade() {
        if let Ok(mut listeners) = registry.write() {
            listeners.retain(|(existing, _)| *existing != id);
        }
    }
}

impl EnrollmentChangeBus for InMemoryChangeBus {
    fn publish(&self, event: &EnrollmentsChanged) {
        if let Ok(mut published) = self.published.write() {
            published.push(event.clone());
        }

        let listeners = self.snapshot();
        tracing::debug!(
            event_type = event.event_type(),
            key = %event.storage_key,
            origin = %event.origin,
            subscribers = listeners.len(),
            "publishing enrollment change"
        );
        for listener in listeners {
            listener.on_enrollments_changed(event);
        }
    }

    fn subscribe(&self, listener: Arc<dyn EnrollmentListener>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.listeners.write() {
            Ok(mut listeners) => listeners.push((id, listener)),
            Err(e) => {
                tracing::warn!("InMemoryChangeBus: cannot subscribe: {}", e);
                return Subscription::detached();
            }
        }
        let registry = Arc::downgrade(&self.listeners);
        Subscription::new(move || unregister(&registry, id))
    }
}
