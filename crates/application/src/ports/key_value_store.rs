//! Key-value store port
//!
//! A minimal durable string map, the shape of browser local storage.

use async_trait::async_trait;

/// Errors that can occur during key-value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable string slots keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a slot. Returns `None` if the key is not set.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a slot, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be persisted.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a slot. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the change cannot be persisted.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
