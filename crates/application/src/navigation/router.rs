//! Path navigation with guard-driven redirects

use std::sync::Arc;

use tracing::{debug, info};
use warden_domain::{Location, NavigationOutcome};

use super::NavigationError;
use super::guard::NavigationGuard;
use crate::session::SessionManager;

/// Redirects followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 10;

/// Resolves navigations and records where the host ends up.
#[derive(Clone)]
pub struct Router {
    guard: NavigationGuard,
    manager: Arc<SessionManager>,
}

impl Router {
    /// Creates a router that applies `guard` and reports to `manager`.
    #[must_use]
    pub const fn new(guard: NavigationGuard, manager: Arc<SessionManager>) -> Self {
        Self { guard, manager }
    }

    /// Navigates to `path`, following guard redirects.
    ///
    /// Returns the location the navigation settled on.
    ///
    /// # Errors
    ///
    /// - [`NavigationError::InvalidLocation`] if `path` is not an in-app path.
    /// - [`NavigationError::RedirectLoop`] after [`MAX_REDIRECTS`] redirects.
    pub async fn push(&self, path: &str) -> Result<Location, NavigationError> {
        let mut location: Location = path.parse()?;

        for hop in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&location).await {
                NavigationOutcome::Proceed => {
                    info!(path = %location, hops = hop, "Navigated");
                    self.manager.set_current_path(location.path.clone());
                    return Ok(location);
                }
                NavigationOutcome::Redirect(next) => {
                    debug!(from = %location, to = %next, "Redirected");
                    location = next;
                }
            }
        }

        Err(NavigationError::RedirectLoop {
            path: path.to_string(),
            hops: MAX_REDIRECTS,
        })
    }
}
