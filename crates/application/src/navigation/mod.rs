//! Route guard and router
//!
//! The guard decides, per navigation, whether to continue or where to go
//! instead. The router applies it to a path and follows redirects.

mod guard;
mod router;

pub use guard::NavigationGuard;
pub use router::{MAX_REDIRECTS, Router};

use thiserror::Error;
use warden_domain::DomainError;

/// A navigation that could not be resolved.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Redirects kept bouncing without settling.
    #[error("redirect loop starting at '{path}' after {hops} hops")]
    RedirectLoop {
        /// Path the navigation started from.
        path: String,
        /// Redirects followed before giving up.
        hops: usize,
    },

    /// The target could not be parsed.
    #[error(transparent)]
    InvalidLocation(#[from] DomainError),
}
