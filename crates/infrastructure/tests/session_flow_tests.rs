//! End-to-end session flows over HTTP and the file store

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use warden_application::{PipelineError, SessionConfig, SessionEvent, SessionManager};
use warden_domain::ApiRequest;
use warden_infrastructure::{FileKeyValueStore, ReqwestTransport};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    dir: TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().unwrap(),
        }
    }

    fn config(&self) -> SessionConfig {
        SessionConfig::with_base_url(self.server.uri())
    }

    async fn manager(&self) -> Arc<SessionManager> {
        let config = self.config();
        let transport = Arc::new(ReqwestTransport::new(&config).unwrap());
        let store = Arc::new(FileKeyValueStore::new(self.dir.path().join("session.json")));
        Arc::new(SessionManager::restore(transport, store, config).await)
    }

    async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access": "stale", "refresh": "refresh-1"})),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "email": "kim@example.com",
                "name": "Kim Ng",
                "groups": ["Admin"],
                "sites": [],
                "is_active": true
            })))
            .mount(&self.server)
            .await;
    }

    async fn mount_reports(&self) {
        Mock::given(method("GET"))
            .and(path("/reports"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 2})))
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn test_login_survives_restart() {
    let harness = Harness::start().await;
    harness.mount_login().await;

    let manager = harness.manager().await;
    let result = manager.login("kim@example.com", "pw").await;
    assert!(result.success, "{result:?}");

    let restarted = harness.manager().await;

    assert!(restarted.is_authenticated());
    assert!(restarted.is_admin());
    assert_eq!(restarted.initials(), "KN");
    assert_eq!(restarted.snapshot(), manager.snapshot());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_expiry_triggers_one_refresh() {
    let harness = Harness::start().await;
    harness.mount_login().await;
    harness.mount_reports().await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "fresh"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&harness.server)
        .await;

    let manager = harness.manager().await;
    assert!(manager.login("kim@example.com", "pw").await.success);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.send(ApiRequest::get("/reports")).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["count"], 2);
    }

    assert_eq!(manager.access_token().as_deref(), Some("fresh"));
    let restarted = harness.manager().await;
    assert_eq!(restarted.access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_rejected_refresh_ends_session() {
    let harness = Harness::start().await;
    harness.mount_login().await;
    harness.mount_reports().await;

    Mock::given(method("POST"))
        .and(path("/auth/token/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&harness.server)
        .await;

    let manager = harness.manager().await;
    assert!(manager.login("kim@example.com", "pw").await.success);
    manager.set_current_path("/reports");
    let mut events = manager.subscribe();

    let err = manager.send(ApiRequest::get("/reports")).await.unwrap_err();

    assert!(matches!(err, PipelineError::Refresh(_)), "{err:?}");
    assert!(!manager.is_authenticated());
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::LoginRequired {
            from: "/reports".to_string()
        }
    );

    let restarted = harness.manager().await;
    assert!(!restarted.is_authenticated());
}

#[tokio::test]
async fn test_logout_invalidates_refresh_token() {
    let harness = Harness::start().await;
    harness.mount_login().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer stale"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(205))
        .expect(1)
        .mount(&harness.server)
        .await;

    let manager = harness.manager().await;
    assert!(manager.login("kim@example.com", "pw").await.success);

    manager.logout().await;

    assert!(!manager.is_authenticated());
    assert!(!harness.manager().await.is_authenticated());
}
