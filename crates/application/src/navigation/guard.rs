//! Pre-navigation authentication check

use std::sync::Arc;

use tracing::debug;
use warden_domain::{Location, NavigationOutcome, REDIRECT_QUERY, RouteTable};

use crate::session::SessionManager;

/// Runs before every navigation.
#[derive(Clone)]
pub struct NavigationGuard {
    manager: Arc<SessionManager>,
    routes: Arc<RouteTable>,
}

impl NavigationGuard {
    /// Creates a guard over `routes` reading state from `manager`.
    #[must_use]
    pub const fn new(manager: Arc<SessionManager>, routes: Arc<RouteTable>) -> Self {
        Self { manager, routes }
    }

    /// Route table the guard consults.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decides whether navigation to `to` may proceed.
    ///
    /// Protected targets need a session whose access token verifies, or can
    /// be refreshed. Authenticated users are sent away from the login route.
    pub async fn before_each(&self, to: &Location) -> NavigationOutcome {
        if self.routes.requires_auth(&to.path) {
            if !self.manager.is_authenticated() {
                debug!(path = %to.path, "Anonymous navigation to protected route");
                return self.to_login(to);
            }
            if !self.session_is_usable().await {
                debug!(path = %to.path, "Session could not be renewed");
                return self.to_login(to);
            }
            return NavigationOutcome::Proceed;
        }

        if self.routes.is_login(&to.path) && self.manager.is_authenticated() {
            return NavigationOutcome::Redirect(resume_target(to));
        }

        NavigationOutcome::Proceed
    }

    async fn session_is_usable(&self) -> bool {
        if self.manager.verify_token().await {
            return true;
        }
        debug!("Access token rejected, refreshing");
        self.manager.refresh_access_token().await
    }

    fn to_login(&self, to: &Location) -> NavigationOutcome {
        NavigationOutcome::Redirect(
            Location::new(self.routes.login_path()).with_query(REDIRECT_QUERY, to.full_path()),
        )
    }
}

/// Where to go after login: the `redirect` query if it is one in-app path.
fn resume_target(login: &Location) -> Location {
    login
        .query_value(REDIRECT_QUERY)
        .filter(|target| target.starts_with('/'))
        .and_then(|target| target.parse().ok())
        .unwrap_or_else(|| Location::new("/"))
}
