//! Integration tests for the reqwest transport

use std::time::Duration;

use serde_json::json;
use warden_application::ports::{Transport, TransportError};
use warden_application::SessionConfig;
use warden_domain::{ApiRequest, HttpMethod};
use warden_infrastructure::ReqwestTransport;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new(&SessionConfig::with_base_url(format!("{}/api/v1", server.uri())))
        .unwrap()
}

#[tokio::test]
async fn test_post_sends_json_with_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer abc"))
        .and(body_json(json!({"email": "kim@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = ApiRequest::post(
        "/auth/login",
        json!({"email": "kim@example.com", "password": "pw"}),
    );
    request.set_bearer("abc");

    let response = transport_for(&server).send(&request).await.unwrap();

    assert!(response.status.is_success());
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["access"], "a");
}

#[tokio::test]
async fn test_error_statuses_are_returned_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "token expired"})),
        )
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .send(&ApiRequest::get("/users/me"))
        .await
        .unwrap();

    assert!(response.status.is_auth_failure());
    assert_eq!(response.error_message().as_deref(), Some("token expired"));
    assert_eq!(
        response.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn test_method_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/sites/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .send(&ApiRequest::new(HttpMethod::Delete, "/sites/4"))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 204);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut config = SessionConfig::with_base_url(format!("{}/api/v1", server.uri()));
    config.request_timeout_secs = 1;
    let transport = ReqwestTransport::new(&config).unwrap();

    let err = transport
        .send(&ApiRequest::get("/slow"))
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::Timeout { timeout_ms: 1000 });
}
