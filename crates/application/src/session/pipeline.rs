//! Request pipeline with single-flight token refresh
//!
//! Outbound, every request gets the persisted access token as a bearer
//! credential. Inbound, a 401/403 on a request that has not been replayed yet
//! starts at most one refresh: the first failing request leads it, requests
//! failing meanwhile queue behind it, and all of them replay with the new token
//! or fail with the same error.

use tokio::sync::oneshot;
use tracing::{debug, warn};
use warden_domain::{ApiRequest, ApiResponse};

use super::manager::SessionManager;
use crate::error::{PipelineError, RefreshError};

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

/// In-flight flag plus the requests waiting on the refresh.
#[derive(Debug, Default)]
pub(crate) struct RefreshQueue {
    in_flight: bool,
    waiters: Vec<Waiter>,
}

impl RefreshQueue {
    /// Clears the flag and hands back every waiter.
    fn finish(&mut self) -> Vec<Waiter> {
        self.in_flight = false;
        std::mem::take(&mut self.waiters)
    }
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<Result<String, RefreshError>>),
}

/// Owned by the leading request while its refresh runs.
///
/// If the leader is dropped before settling, queued requests are released
/// with [`RefreshError::Abandoned`] and the flag is cleared.
struct InFlight<'a> {
    manager: &'a SessionManager,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: &Result<String, RefreshError>) {
        self.settled = true;
        let waiters = self.manager.refresh.lock().finish();
        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Releasing queued requests");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let waiters = self.manager.refresh.lock().finish();
        warn!(waiters = waiters.len(), "Refresh dropped before completion");
        for waiter in waiters {
            let _ = waiter.send(Err(RefreshError::Abandoned));
        }
    }
}

impl SessionManager {
    /// Sends a request through the pipeline.
    ///
    /// Returns the response for any 2xx status.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Refresh`] if authorization failed and no new token
    ///   could be obtained (the session is then cleared).
    /// - [`PipelineError::Unauthorized`] if the replayed request is refused again.
    /// - [`PipelineError::Status`] for any other non-success status.
    /// - [`PipelineError::Transport`] if no response was received.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, PipelineError> {
        let sent_with = self.authorize(&mut request).await;
        let response = self.transport.send(&request).await?;

        if !response.status.is_auth_failure() {
            return settle(response);
        }
        if request.retried {
            return Err(PipelineError::Unauthorized {
                status: response.status,
            });
        }
        request.retried = true;

        debug!(path = %request.path, status = %response.status, "Authorization failed");

        let token = match self.stale_token(sent_with.as_deref()) {
            Some(current) => {
                debug!(path = %request.path, "Token changed since send, replaying");
                current
            }
            None => self.refreshed_token().await?,
        };

        request.set_bearer(&token);
        self.replay(&request).await
    }

    /// Sends a GET and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::send`], or with [`PipelineError::Status`] if the
    /// body does not decode.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, PipelineError> {
        let response = self.send(ApiRequest::get(path)).await?;
        response.json().map_err(|e| PipelineError::Status {
            status: response.status,
            body: format!("undecodable body: {e}"),
        })
    }

    /// Attaches the persisted access token, falling back to default headers.
    async fn authorize(&self, request: &mut ApiRequest) -> Option<String> {
        self.apply_default_headers(request);
        if let Some(token) = self.store.access_token().await {
            request.set_bearer(&token);
        }
        request.bearer_token().map(String::from)
    }

    /// The current token, if it differs from the one the request carried.
    fn stale_token(&self, sent_with: Option<&str>) -> Option<String> {
        self.access_token()
            .filter(|current| sent_with != Some(current.as_str()))
    }

    /// Joins the in-flight refresh or starts one.
    async fn refreshed_token(&self) -> Result<String, RefreshError> {
        let role = {
            let mut queue = self.refresh.lock();
            if queue.in_flight {
                let (tx, rx) = oneshot::channel();
                queue.waiters.push(tx);
                Role::Follower(rx)
            } else {
                queue.in_flight = true;
                Role::Leader
            }
        };

        match role {
            Role::Follower(rx) => {
                debug!("Waiting on in-flight refresh");
                rx.await.unwrap_or(Err(RefreshError::Abandoned))
            }
            Role::Leader => {
                let flight = InFlight {
                    manager: self,
                    settled: false,
                };
                let outcome = self.refresh_session().await;
                flight.settle(&outcome);
                // Whoever cleared or replaced the session already prompted.
                if outcome
                    .as_ref()
                    .is_err_and(|e| *e != RefreshError::Superseded)
                {
                    self.require_login();
                }
                outcome
            }
        }
    }

    async fn replay(&self, request: &ApiRequest) -> Result<ApiResponse, PipelineError> {
        let response = self.transport.send(request).await?;
        if response.status.is_auth_failure() {
            return Err(PipelineError::Unauthorized {
                status: response.status,
            });
        }
        settle(response)
    }
}

fn settle(response: ApiResponse) -> Result<ApiResponse, PipelineError> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(PipelineError::Status {
            status: response.status,
            body: response.text(),
        })
    }
}
