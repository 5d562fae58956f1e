//! Session manager configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Credentials → access + refresh token (+ optional profile).
    pub login: String,
    /// Refresh token invalidation.
    pub logout: String,
    /// Current-user profile.
    pub user_info: String,
    /// Access token validation.
    pub token_verify: String,
    /// Refresh token → new access token.
    pub token_refresh: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            logout: "/auth/logout".to_string(),
            user_info: "/users/me".to_string(),
            token_verify: "/auth/token/verify".to_string(),
            token_refresh: "/auth/token/refresh".to_string(),
        }
    }
}

/// Settings shared by the session manager and its transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// API root every request path is joined to.
    pub base_url: String,
    /// Endpoint paths.
    pub endpoints: Endpoints,
    /// Body field carrying the refresh token on refresh requests.
    pub refresh_field: String,
    /// Path of the login route; no login prompt is raised while on it.
    pub login_path: String,
    /// Upper bound on a single refresh call.
    pub refresh_timeout_secs: u64,
    /// Per-request timeout used by the transport.
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            endpoints: Endpoints::default(),
            refresh_field: "refresh".to_string(),
            login_path: "/login".to_string(),
            refresh_timeout_secs: 30,
            request_timeout_secs: 30,
        }
    }
}

impl SessionConfig {
    /// Creates a default configuration for `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Refresh timeout as a `Duration`.
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// True if `path` is on the login route.
    #[must_use]
    pub fn is_login_path(&self, path: &str) -> bool {
        path.starts_with(self.login_path.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.endpoints.token_refresh, "/auth/token/refresh");
        assert_eq!(config.refresh_timeout(), Duration::from_secs(30));
        assert_eq!(config.refresh_field, "refresh");
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let config: SessionConfig = serde_json::from_str(
            r#"{"base_url": "https://api.example.com", "endpoints": {"token_refresh": "/auth/token/refresh/"}}"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.endpoints.token_refresh, "/auth/token/refresh/");
        assert_eq!(config.endpoints.login, "/auth/login");
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn test_is_login_path() {
        let config = SessionConfig::default();
        assert!(config.is_login_path("/login"));
        assert!(config.is_login_path("/login?redirect=%2Fsites"));
        assert!(!config.is_login_path("/sites"));
    }
}
