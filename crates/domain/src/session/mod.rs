//! Session domain types

mod profile;
mod state;

pub use profile::{ADMIN_GROUP, UserProfile, initials};
pub use state::{Session, bearer, token_preview};
