//! Authoritative session state and its derived views

use serde::{Deserialize, Serialize};

use super::profile::{ADMIN_GROUP, UserProfile};

/// Authentication state of the running client.
///
/// Derived values (`is_authenticated`, `is_admin`, `initials`, permissions)
/// are plain functions recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential.
    pub access_token: Option<String>,
    /// Long-lived credential used only to mint new access tokens.
    pub refresh_token: Option<String>,
    /// Cached profile of the signed-in user.
    pub user: Option<UserProfile>,
}

impl Session {
    /// Creates a session holding both tokens and no profile.
    #[cfg(test)]
    #[must_use]
    pub fn with_tokens(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            user: None,
        }
    }

    /// Both tokens are present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// The user belongs to the `Admin` group.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_permission(ADMIN_GROUP)
    }

    /// Initials of the user's display name, empty without a user.
    #[must_use]
    pub fn initials(&self) -> String {
        self.user.as_ref().map(UserProfile::initials).unwrap_or_default()
    }

    /// The user's groups contain `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.user.as_ref().is_some_and(|u| u.in_group(permission))
    }

    /// The user's groups contain at least one of `permissions`.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Returns the `Authorization` header value for the current access token.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.access_token.as_deref().map(bearer)
    }

    /// Resets tokens and profile together.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Formats a bearer `Authorization` header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Shortened token for log output (first 8 chars + `...`).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}
