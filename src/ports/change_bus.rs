//! EnrollmentChangeBus port - same-context change notification.
//!
//! Every reconciler sharing a process subscribes here so a mutation made
//! through one instance becomes visible to all others without a reload.
//! Delivery is synchronous and in subscription order.

use std::fmt;
use std::sync::Arc;

use crate::domain::enrollment::EnrollmentsChanged;

/// Receiver of enrollment change notifications.
///
/// Called on the publisher's thread; implementations must not publish
/// back onto the bus from inside the callback.
pub trait EnrollmentListener: Send + Sync {
    fn on_enrollments_changed(&self, event: &EnrollmentsChanged);
}

/// Port for publishing and subscribing to enrollment changes.
pub trait EnrollmentChangeBus: Send + Sync {
    /// Delivers `event` to every current subscriber.
    fn publish(&self, event: &EnrollmentsChanged);

    /// Registers a listener until the returned handle is dropped.
    fn subscribe(&self, listener: Arc<dyn EnrollmentListener>) -> Subscription;
}

/// Handle that keeps a listener registered.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) runs the
/// adapter-supplied cancel hook exactly once.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn change_bus_is_object_safe() {
        fn _accepts_dyn(_bus: &dyn EnrollmentChangeBus) {}
        fn _accepts_listener(_listener: Arc<dyn EnrollmentListener>) {}
    }

    #[test]
    fn cancel_runs_once_on_drop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_unsubscribe_does_not_cancel_twice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detached_subscription_is_inactive() {
        let sub = Subscription::detached();
        assert!(format!("{:?}", sub).contains("false"));
    }
}
