//! Ports - interfaces to everything outside the domain.
//!
//! Adapters implement these; application services depend only on the
//! traits, injected as `Arc<dyn Port>`.

mod change_bus;
mod key_value_store;
mod remote_enrollment_store;

pub use change_bus::{EnrollmentChangeBus, EnrollmentListener, Subscription};
pub use key_value_store::{KeyValueStore, StorageError};
pub use remote_enrollment_store::{RemoteEnrollmentStore, RemoteError};
