//! Remote enrollment store adapters.

mod http;
mod in_memory;

pub use http::{HttpEnrollmentStore, HttpStoreConfig};
pub use in_memory::InMemoryRemoteStore;
