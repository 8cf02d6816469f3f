//! CLI integration tests against a mock API.
//!
//! Each test runs the built binary with its own temporary HOME and session
//! directory, so nothing touches the real user profile.

mod common;

use ledgerdesk_core::SessionStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{jwt, run_cli, run_cli_success, seed_session, store};

#[tokio::test(flavor = "multi_thread")]
async fn login_then_whoami() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    let access = jwt(json!({
        "sub": "clerk-1",
        "current_company_id": 42,
        "exp": 4102444800i64
    }));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "clerk@example.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access,
            "refreshToken": "refresh-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &[
            "session",
            "login",
            "--email",
            "clerk@example.com",
            "--password",
            "secret",
        ],
        home.path(),
        &server.uri(),
    )
    .await;
    assert!(stdout.contains("Logged in successfully"));
    assert!(stdout.contains("42"));

    let stdout = run_cli_success(&["session", "whoami", "--json"], home.path(), &server.uri()).await;
    let summary: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["kind"], "user");
    assert_eq!(summary["namespace"], "user");
    assert_eq!(summary["scope"], "42");
    assert_eq!(summary["subject"], "clerk-1");
    assert!(summary["expires_at"].as_str().unwrap().starts_with("2100-01-01"));
}

#[tokio::test(flavor = "multi_thread")]
async fn whoami_without_session_fails() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    let output = run_cli(&["session", "whoami"], home.path(), &server.uri()).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn request_refreshes_expired_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    seed_session(home.path(), "user", "stale-access", "refresh-1").await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer stale-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("authorization", "Bearer refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "fresh-access",
            "refreshToken": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer fresh-access"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &["session", "request", "get", "/products", "--query", "page=2", "--compact"],
        home.path(),
        &server.uri(),
    )
    .await;
    assert_eq!(stdout.trim(), r#"[{"id":7}]"#);

    let stored = store(home.path(), "user").load().await.unwrap().unwrap();
    assert_eq!(stored.access_token().as_str(), "fresh-access");
    assert_eq!(stored.refresh_token().as_str(), "refresh-2");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_reports_expired_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    seed_session(home.path(), "user", "stale-access", "stale-refresh").await;

    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli(&["session", "request", "GET", "/customers"], home.path(), &server.uri()).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("log in again at /"), "stderr: {stderr}");
    assert!(store(home.path(), "user").load().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_refresh_command_uses_admin_endpoint() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    seed_session(home.path(), "admin", "admin-access", "admin-refresh").await;

    Mock::given(method("POST"))
        .and(path("/admin/auth/refresh"))
        .and(header("authorization", "Bearer admin-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "adminAccessToken": "admin-access-2",
            "adminRefreshToken": "admin-refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &["--kind", "admin", "session", "refresh"],
        home.path(),
        &server.uri(),
    )
    .await;
    assert!(stdout.contains("Session refreshed"));

    let stored = store(home.path(), "admin").load().await.unwrap().unwrap();
    assert_eq!(stored.access_token().as_str(), "admin-access-2");
    // The user namespace is untouched.
    assert!(store(home.path(), "user").load().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_clears_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    seed_session(home.path(), "user", "access", "refresh").await;

    let stdout = run_cli_success(&["session", "logout"], home.path(), &server.uri()).await;
    assert!(stdout.contains("Logged out"));

    assert!(store(home.path(), "user").load().await.unwrap().is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn request_with_empty_body_prints_status() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    seed_session(home.path(), "user", "access", "refresh").await;

    Mock::given(method("DELETE"))
        .and(path("/products/9"))
        .and(header("authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &["session", "request", "delete", "/products/9"],
        home.path(),
        &server.uri(),
    )
    .await;
    assert!(stdout.contains("204 /products/9"), "stdout: {stdout}");
}
