//! Route table of the admin console.

use warden_domain::{Route, RouteTable};

/// Name of the login route.
pub const LOGIN_ROUTE: &str = "Login";

/// Routes served by the console. Everything but login requires a session.
pub fn default_routes() -> RouteTable {
    [
        ("Home", "/"),
        ("Regions & Clusters", "/regions"),
        ("Sites", "/sites"),
        ("Zones & Spaces", "/zones"),
        ("Vendors", "/vendors"),
        ("Manufacturers", "/manufacturers"),
        ("Systems", "/systems"),
    ]
    .into_iter()
    .fold(
        RouteTable::new(LOGIN_ROUTE)
            .with_route(Route::public(LOGIN_ROUTE, "/login").with_layout("auth")),
        |table, (name, path)| table.with_route(Route::protected(name, path)),
    )
}
