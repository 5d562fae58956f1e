//! Session state, auth operations and the request pipeline

mod events;
mod manager;
mod operations;
mod pipeline;
mod store;

pub use events::SessionEvent;
pub use manager::SessionManager;
pub use operations::{LOGIN_FAILED, LoginResult};
pub use store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SessionStore, USER_KEY};
