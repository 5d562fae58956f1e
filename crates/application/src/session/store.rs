//! Persistent session store
//!
//! Mirrors the session into three string slots of a [`KeyValueStore`].
//! Persistence is a side effect: failures are logged and never abort the
//! operation that triggered them.

use std::sync::Arc;

use tracing::{debug, warn};
use warden_domain::{Session, UserProfile};

use crate::ports::KeyValueStore;

/// Slot holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Slot holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Slot holding the JSON-encoded user profile.
pub const USER_KEY: &str = "user";

/// Durable mirror of the [`Session`].
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wraps a key-value store.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Reads the persisted session.
    ///
    /// A stored profile that does not decode is removed and the session
    /// starts without a user.
    pub async fn load(&self) -> Session {
        let access_token = self.read(ACCESS_TOKEN_KEY).await;
        let refresh_token = self.read(REFRESH_TOKEN_KEY).await;

        let user = match self.read(USER_KEY).await {
            Some(raw) => match UserProfile::from_json(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt stored user profile");
                    self.delete(USER_KEY).await;
                    None
                }
            },
            None => None,
        };

        debug!(
            has_access = access_token.is_some(),
            has_refresh = refresh_token.is_some(),
            has_user = user.is_some(),
            "Loaded persisted session"
        );

        Session {
            access_token,
            refresh_token,
            user,
        }
    }

    /// Current access token as persisted.
    pub async fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY).await
    }

    /// Persists both tokens.
    pub async fn save_tokens(&self, access_token: &str, refresh_token: &str) {
        self.write(ACCESS_TOKEN_KEY, access_token).await;
        self.write(REFRESH_TOKEN_KEY, refresh_token).await;
    }

    /// Persists a new access token only.
    pub async fn save_access_token(&self, access_token: &str) {
        self.write(ACCESS_TOKEN_KEY, access_token).await;
    }

    /// Persists the user profile.
    pub async fn save_user(&self, user: &UserProfile) {
        match user.to_json() {
            Ok(json) => self.write(USER_KEY, &json).await,
            Err(e) => warn!(error = %e, "Failed to encode user profile"),
        }
    }

    /// Removes all three slots.
    pub async fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            self.delete(key).await;
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session slot");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.kv.set(key, value).await {
            warn!(key, error = %e, "Failed to persist session slot");
        }
    }

    async fn delete(&self, key: &str) {
        if let Err(e) = self.kv.remove(key).await {
            warn!(key, error = %e, "Failed to remove session slot");
        }
    }
}
