//! Session manager: owner of the session state
//!
//! The manager is the single writable source of truth for the session in a
//! running process. It owns the in-memory [`Session`], its persistent mirror,
//! the default `Authorization` header, the single-flight refresh queue and
//! the event channel. Operations live in sibling modules:
//! `operations` (login, logout, verify, refresh) and `pipeline` (`send`).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::debug;
use warden_domain::request::AUTHORIZATION;
use warden_domain::{ApiRequest, Session, UserProfile, session::bearer};

use super::events::SessionEvent;
use super::pipeline::RefreshQueue;
use super::store::SessionStore;
use crate::config::SessionConfig;
use crate::ports::{KeyValueStore, Transport};

const EVENT_CAPACITY: usize = 32;

/// Progress of the last login attempt, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LoginStatus {
    pub(crate) is_loading: bool,
    pub(crate) last_error: Option<String>,
}

/// Client-side session manager.
///
/// Share it behind an `Arc`; every method takes `&self`. The `parking_lot`
/// locks are never held across an `.await`. Session writes that also touch
/// storage are serialized by an async mutex, so a clear cannot interleave
/// with an install.
///
/// Every clear and every fresh token pair bumps a generation counter.
/// Operations that await the network capture it first and drop their
/// result if it moved.
pub struct SessionManager {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) store: SessionStore,
    pub(super) config: SessionConfig,
    pub(super) session: RwLock<Session>,
    pub(super) default_headers: RwLock<BTreeMap<String, String>>,
    pub(super) login_status: RwLock<LoginStatus>,
    pub(super) refresh: Mutex<RefreshQueue>,
    current_path: RwLock<String>,
    events: broadcast::Sender<SessionEvent>,
    generation: AtomicU64,
    writes: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// Builds a manager seeded from the persisted session.
    pub async fn restore(
        transport: Arc<dyn Transport>,
        kv: Arc<dyn KeyValueStore>,
        config: SessionConfig,
    ) -> Self {
        let store = SessionStore::new(kv);
        let session = store.load().await;

        let mut default_headers = BTreeMap::new();
        if let Some(header) = session.authorization_header() {
            default_headers.insert(AUTHORIZATION.to_string(), header);
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            transport,
            store,
            config,
            session: RwLock::new(session),
            default_headers: RwLock::new(default_headers),
            login_status: RwLock::new(LoginStatus::default()),
            refresh: Mutex::new(RefreshQueue::default()),
            current_path: RwLock::new("/".to_string()),
            events,
            generation: AtomicU64::new(0),
            writes: tokio::sync::Mutex::new(()),
        }
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    /// Both tokens are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    /// The user is in the `Admin` group.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session.read().is_admin()
    }

    /// Initials of the user's display name.
    #[must_use]
    pub fn initials(&self) -> String {
        self.session.read().initials()
    }

    /// The user's groups contain `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.session.read().has_permission(permission)
    }

    /// The user's groups contain one of `permissions`.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        self.session.read().has_any_permission(permissions)
    }

    /// Cached user profile.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.session.read().user.clone()
    }

    /// Current access token.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.session.read().access_token.clone()
    }

    /// A login call is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.login_status.read().is_loading
    }

    /// Message of the last failed login, cleared by a successful one.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.login_status.read().last_error.clone()
    }

    /// Default header applied to every request that does not set it.
    #[must_use]
    pub fn default_header(&self, name: &str) -> Option<String> {
        self.default_headers
            .read()
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Receives session lifecycle events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Path of the route the host is currently showing.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.current_path.read().clone()
    }

    /// Records the route the host is showing.
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current_path.write() = path.into();
    }

    /// Clears tokens and profile from memory and storage, and drops the
    /// default `Authorization` header.
    pub async fn clear_tokens(&self) {
        let _writes = self.writes.lock().await;
        self.clear_locked().await;
    }

    /// Clears the session unless it changed since `generation` was read.
    pub(super) async fn clear_if_current(&self, generation: u64) -> bool {
        let _writes = self.writes.lock().await;
        if self.generation() != generation {
            return false;
        }
        self.clear_locked().await;
        true
    }

    async fn clear_locked(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session.write().clear();
        self.default_headers.write().remove(AUTHORIZATION);
        self.store.clear().await;
        debug!("Session cleared");
    }

    /// Current session generation.
    pub(super) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Installs a fresh token pair and starts a new generation.
    pub(super) async fn install_tokens(&self, access_token: &str, refresh_token: &str) -> u64 {
        let _writes = self.writes.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut session = self.session.write();
            session.access_token = Some(access_token.to_string());
            session.refresh_token = Some(refresh_token.to_string());
        }
        self.set_default_authorization(access_token);
        self.store.save_tokens(access_token, refresh_token).await;
        generation
    }

    /// Installs a refreshed access token, and the rotated refresh token if
    /// the backend sent one. Returns false, changing nothing, when the
    /// session moved past `generation`.
    pub(super) async fn install_refreshed(
        &self,
        generation: u64,
        access_token: &str,
        rotated: Option<&str>,
    ) -> bool {
        let _writes = self.writes.lock().await;
        if self.generation() != generation {
            return false;
        }
        {
            let mut session = self.session.write();
            session.access_token = Some(access_token.to_string());
            if let Some(rotated) = rotated {
                session.refresh_token = Some(rotated.to_string());
            }
        }
        self.set_default_authorization(access_token);
        match rotated {
            Some(rotated) => self.store.save_tokens(access_token, rotated).await,
            None => self.store.save_access_token(access_token).await,
        }
        true
    }

    /// Caches `user` unless the session moved past `generation`.
    pub(super) async fn install_user(&self, generation: u64, user: UserProfile) -> bool {
        let _writes = self.writes.lock().await;
        let current =
            self.generation() == generation && self.session.read().access_token.is_some();
        if !current {
            return false;
        }
        self.store.save_user(&user).await;
        self.session.write().user = Some(user);
        true
    }

    fn set_default_authorization(&self, access_token: &str) {
        self.default_headers
            .write()
            .insert(AUTHORIZATION.to_string(), bearer(access_token));
    }

    /// Copies default headers the request does not already carry.
    pub(super) fn apply_default_headers(&self, request: &mut ApiRequest) {
        for (name, value) in self.default_headers.read().iter() {
            if request.header(name).is_none() {
                request.set_header(name, value.clone());
            }
        }
    }

    pub(super) fn emit(&self, event: SessionEvent) {
        if self.events.send(event.clone()).is_err() {
            debug!(?event, "No subscribers for session event");
        }
    }

    /// Asks the host to show the login screen, unless it already does.
    pub(super) fn require_login(&self) {
        let from = self.current_path();
        if self.config.is_login_path(&from) {
            debug!("Already on login route, no prompt raised");
            return;
        }
        self.emit(SessionEvent::LoginRequired { from });
    }
}
