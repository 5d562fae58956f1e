//! Warden Application - Session manager and navigation guard
//!
//! This crate holds the client-side session logic: the [`SessionManager`]
//! with its auth operations and single-flight refresh pipeline, the
//! navigation guard, and the ports ([`Transport`], [`KeyValueStore`]) that
//! infrastructure adapters implement.

pub mod config;
pub mod error;
pub mod navigation;
pub mod ports;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{Endpoints, SessionConfig};
pub use error::{ApplicationError, ApplicationResult, PipelineError, RefreshError};
pub use navigation::{MAX_REDIRECTS, NavigationError, NavigationGuard, Router};
pub use ports::{KeyValueStore, StorageError, Transport, TransportError};
pub use session::{LOGIN_FAILED, LoginResult, SessionEvent, SessionManager, SessionStore};
