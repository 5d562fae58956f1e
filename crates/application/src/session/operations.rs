//! Auth operations: login, logout, profile fetch, verify and refresh
//!
//! Every operation converts its failures into a `bool` or [`LoginResult`];
//! nothing escapes as an error past this boundary.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};
use warden_domain::session::token_preview;
use warden_domain::{ApiRequest, ApiResponse, UserProfile};

use super::events::SessionEvent;
use super::manager::{LoginStatus, SessionManager};
use crate::error::RefreshError;
use crate::ports::TransportError;

/// Message shown when the backend gives no reason for a failed login.
pub const LOGIN_FAILED: &str = "Login failed";

/// Outcome of [`SessionManager::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Credentials were accepted and tokens stored.
    pub success: bool,
    /// Human-readable failure reason.
    pub error: Option<String>,
}

impl LoginResult {
    const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    const fn failure(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    access: String,
    #[serde(alias = "refresh_token")]
    refresh: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access")]
    access_token: String,
    #[serde(default, alias = "refresh")]
    refresh_token: Option<String>,
}

/// Resets `is_loading` however the login future ends.
struct LoadingGuard<'a>(&'a parking_lot::RwLock<LoginStatus>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.write().is_loading = false;
    }
}

impl SessionManager {
    /// Exchanges credentials for tokens, then loads the user profile.
    pub async fn login(&self, email: &str, password: &str) -> LoginResult {
        {
            let mut status = self.login_status.write();
            status.is_loading = true;
            status.last_error = None;
        }
        let _loading = LoadingGuard(&self.login_status);

        match self.try_login(email, password).await {
            Ok(()) => {
                info!(email, "Logged in");
                self.emit(SessionEvent::LoggedIn {
                    email: email.to_string(),
                });
                LoginResult::ok()
            }
            Err(message) => {
                warn!(email, error = %message, "Login failed");
                self.login_status.write().last_error = Some(message.clone());
                LoginResult::failure(message)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<(), String> {
        let request = ApiRequest::post(
            &self.config.endpoints.login,
            json!({ "email": email, "password": password }),
        );

        let response = self.send_direct(request).await.map_err(|e| {
            debug!(error = %e, "Login request did not complete");
            LOGIN_FAILED.to_string()
        })?;

        if !response.status.is_success() {
            return Err(response
                .error_message()
                .unwrap_or_else(|| LOGIN_FAILED.to_string()));
        }

        let tokens: LoginResponse = response.json().map_err(|e| {
            debug!(error = %e, "Malformed login response");
            LOGIN_FAILED.to_string()
        })?;

        let generation = self.install_tokens(&tokens.access, &tokens.refresh).await;
        if let Some(user) = tokens.user {
            self.install_user(generation, user).await;
        }
        self.fetch_user_info().await;
        Ok(())
    }

    /// Invalidates the refresh token server-side (best effort) and clears the session.
    ///
    /// The local session is cleared before the network call, so it is gone
    /// whatever the call does, including when this future is dropped.
    pub async fn logout(&self) {
        let (access_token, refresh_token) = {
            let session = self.session.read();
            (session.access_token.clone(), session.refresh_token.clone())
        };

        self.clear_tokens().await;
        self.emit(SessionEvent::LoggedOut);
        self.require_login();

        let Some(refresh_token) = refresh_token else {
            return;
        };

        let mut request = ApiRequest::post(
            &self.config.endpoints.logout,
            json!({ "refresh_token": refresh_token }),
        );
        if let Some(token) = access_token {
            request.set_bearer(&token);
        }

        match self.transport.send(&request).await {
            Ok(response) if response.status.is_success() => debug!("Refresh token invalidated"),
            Ok(response) => warn!(status = %response.status, "Logout request failed"),
            Err(e) => warn!(error = %e, "Logout request failed"),
        }
    }

    /// Reloads the user profile through the request pipeline.
    ///
    /// Returns true if the profile was replaced. An authorization failure is
    /// handled by the pipeline's refresh; other failures are logged and leave
    /// the tokens alone. A profile arriving after the session was cleared or
    /// replaced is discarded.
    pub async fn fetch_user_info(&self) -> bool {
        if self.session.read().access_token.is_none() {
            return false;
        }
        let generation = self.generation();

        let request = ApiRequest::get(&self.config.endpoints.user_info);
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Failed to fetch user info");
                return false;
            }
        };

        match response.json::<UserProfile>() {
            Ok(user) => {
                let user_id = user.id;
                if self.install_user(generation, user).await {
                    debug!(user_id, "User profile updated");
                    true
                } else {
                    debug!(user_id, "Session changed during profile fetch, profile discarded");
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "Malformed user profile response");
                false
            }
        }
    }

    /// Asks the backend whether the access token is still valid.
    ///
    /// Any failure, including transport errors, counts as invalid.
    pub async fn verify_token(&self) -> bool {
        let Some(token) = self.access_token() else {
            return false;
        };

        let request = ApiRequest::post(&self.config.endpoints.token_verify, json!({ "token": token }));
        match self.send_direct(request).await {
            Ok(response) => {
                debug!(status = %response.status, token = %token_preview(&token), "Token verified");
                response.status.is_success()
            }
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                false
            }
        }
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// On failure the session is cleared. Concurrent calls are not merged
    /// here; the request pipeline does that. If the session is cleared or
    /// replaced while the call is pending, its result is dropped and the
    /// newer session is left as it is.
    pub async fn refresh_access_token(&self) -> bool {
        self.refresh_session().await.is_ok()
    }

    pub(super) async fn refresh_session(&self) -> Result<String, RefreshError> {
        let generation = self.generation();
        let refresh_token = self.session.read().refresh_token.clone();
        let Some(refresh_token) = refresh_token else {
            debug!("No refresh token, clearing session");
            self.clear_tokens().await;
            return Err(RefreshError::MissingRefreshToken);
        };

        let timeout = self.config.refresh_timeout();
        let outcome = tokio::time::timeout(timeout, self.exchange_refresh_token(&refresh_token))
            .await
            .unwrap_or(Err(RefreshError::TimedOut {
                timeout_secs: timeout.as_secs(),
            }));

        match outcome {
            Ok(tokens) => {
                let installed = self
                    .install_refreshed(
                        generation,
                        &tokens.access_token,
                        tokens.refresh_token.as_deref(),
                    )
                    .await;
                if !installed {
                    warn!("Session changed during refresh, new token discarded");
                    return Err(RefreshError::Superseded);
                }
                info!(token = %token_preview(&tokens.access_token), "Access token refreshed");
                self.emit(SessionEvent::TokenRefreshed);
                Ok(tokens.access_token)
            }
            Err(e) => {
                if self.clear_if_current(generation).await {
                    warn!(error = %e, "Token refresh failed, session cleared");
                } else {
                    debug!(error = %e, "Token refresh failed after session changed");
                }
                Err(e)
            }
        }
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshResponse, RefreshError> {
        let mut body = serde_json::Map::new();
        body.insert(self.config.refresh_field.clone(), json!(refresh_token));
        let request = ApiRequest::post(&self.config.endpoints.token_refresh, body.into());

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !response.status.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status.as_u16(),
                message: response
                    .error_message()
                    .unwrap_or_else(|| response.status.reason_phrase().to_string()),
            });
        }

        response
            .json()
            .map_err(|e| RefreshError::MalformedResponse(e.to_string()))
    }

    /// Sends on the transport with default headers, bypassing refresh handling.
    pub(super) async fn send_direct(
        &self,
        mut request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.apply_default_headers(&mut request);
        self.transport.send(&request).await
    }
}
