//! Warden Domain - Core session types
//!
//! This crate defines the domain model for the Warden session manager:
//! the session and user profile, request/response values exchanged with the
//! transport, and route metadata read by the navigation guard.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod format;
pub mod request;
pub mod response;
pub mod route;
pub mod session;

pub use error::{DomainError, DomainResult};
pub use format::format_date;
pub use request::{ApiRequest, HttpMethod};
pub use response::{ApiResponse, StatusCode};
pub use route::{Location, NavigationOutcome, REDIRECT_QUERY, Route, RouteTable};
pub use session::{ADMIN_GROUP, Session, UserProfile};
