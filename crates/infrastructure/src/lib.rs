//! Warden Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod persistence;
pub mod serialization;
pub mod settings;

pub use adapters::ReqwestTransport;
pub use persistence::FileKeyValueStore;
pub use serialization::{SerializationError, from_json, to_json_stable};
pub use settings::{
    ConfigError, DEFAULT_CONFIG_FILE, ENV_PREFIX, default_store_path, load_config,
};
