//! Adapters - implementations of the ports.
//!
//! - `storage` - key-value stores (in-memory, one file per key)
//! - `remote` - enrollment service clients (in-memory, HTTP)
//! - `events` - same-process change bus

pub mod events;
pub mod remote;
pub mod storage;

pub use events::InMemoryChangeBus;
pub use remote::{HttpEnrollmentStore, HttpStoreConfig, InMemoryRemoteStore};
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore};
