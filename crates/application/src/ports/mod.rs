//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod key_value_store;
mod transport;

pub use key_value_store::{KeyValueStore, StorageError};
pub use transport::{Transport, TransportError};
