//! Route metadata and navigation locations
//!
//! Routes only carry what the navigation guard reads: a name, a path and
//! whether the route requires an authenticated session.

mod location;

pub use location::Location;

use serde::{Deserialize, Serialize};

/// Query parameter holding the destination to resume after login.
pub const REDIRECT_QUERY: &str = "redirect";

/// A single entry in the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route name, e.g. `Login`.
    pub name: String,
    /// Absolute path, e.g. `/sites`.
    pub path: String,
    /// Navigation requires an authenticated session.
    #[serde(default)]
    pub requires_auth: bool,
    /// Layout hint for the host (`auth` for the login screen).
    #[serde(default)]
    pub layout: Option<String>,
}

impl Route {
    /// A route that requires authentication.
    #[must_use]
    pub fn protected(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            requires_auth: true,
            layout: None,
        }
    }

    /// A route open to anonymous users.
    #[must_use]
    pub fn public(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            requires_auth: false,
            layout: None,
        }
    }

    /// Sets the layout hint.
    #[must_use]
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    fn matches(&self, path: &str) -> bool {
        normalize(&self.path) == normalize(path)
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Ordered set of routes plus the name of the login route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<Route>,
    login_route: String,
}

impl RouteTable {
    /// Creates a table whose login route is named `login_route`.
    #[must_use]
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            login_route: login_route.into(),
        }
    }

    /// Appends a route.
    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Finds the route serving `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matches(path))
    }

    /// Finds a route by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// The login route, if registered.
    #[must_use]
    pub fn login(&self) -> Option<&Route> {
        self.by_name(&self.login_route)
    }

    /// Path of the login route, `/login` when none is registered.
    #[must_use]
    pub fn login_path(&self) -> &str {
        self.login().map_or("/login", |r| r.path.as_str())
    }

    /// True if `path` is served by the login route.
    #[must_use]
    pub fn is_login(&self, path: &str) -> bool {
        self.resolve(path)
            .is_some_and(|r| r.name == self.login_route)
    }

    /// Whether navigating to `path` requires authentication. Unknown paths do not.
    #[must_use]
    pub fn requires_auth(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|r| r.requires_auth)
    }

    /// All registered routes in order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Per-navigation result of the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Continue to the requested location.
    Proceed,
    /// Go somewhere else instead.
    Redirect(Location),
}
