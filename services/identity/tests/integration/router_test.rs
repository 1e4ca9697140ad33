//! HTTP surface over in-memory stores and a disconnected database: every
//! request here must be answered before the directory is consulted.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

use clubhouse_auth_types::cookie::SESSION_COOKIE;
use clubhouse_auth_types::session;
use clubhouse_identity::config::IdentityConfig;
use clubhouse_identity::domain::repository::ChallengeStore;
use clubhouse_identity::infra::ephemeral::EphemeralStores;
use clubhouse_identity::infra::memory::MemoryStores;
use clubhouse_identity::infra::sms::SmsNotifier;
use clubhouse_identity::router::build_router;
use clubhouse_identity::state::AppState;
use clubhouse_testing::auth::MockSession;

use crate::helpers::{TEST_SECRET, memory_stores, phone};

fn test_config() -> IdentityConfig {
    IdentityConfig {
        database_url: "postgres://unused".to_owned(),
        redis_url: None,
        secret_salt: TEST_SECRET.to_owned(),
        production_mode: false,
        site_name: "The Clubhouse".to_owned(),
        site_url: None,
        textbelt_key: None,
        admin_phones: vec![],
        max_members: 200,
        identity_port: 0,
        login_rate_limit_max: 10,
        login_rate_limit_window_secs: 3600,
    }
}

fn app(stores: &MemoryStores) -> Router {
    build_router(AppState {
        db: DatabaseConnection::Disconnected,
        ephemeral: EphemeralStores::Memory(stores.clone()),
        notifier: SmsNotifier::new(None),
        config: Arc::new(test_config()),
    })
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let (_clock, stores) = memory_stores();

    let response = app(&stores)
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_report_degraded_health_without_database() {
    let (_clock, stores) = memory_stores();

    let response = app(&stores)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert!(json["stats"].is_null());
}

#[tokio::test]
async fn should_sign_in_with_issued_code_and_set_session_cookie() {
    let (_clock, stores) = memory_stores();
    let code = stores.challenges.issue(&phone("5551234567")).await.unwrap();

    let response = app(&stores)
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            serde_json::json!({ "phone": "(555) 123-4567", "code": code }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookies = set_cookies(&response);
    let session_cookie = cookies
        .iter()
        .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
        .expect("session cookie set");
    assert!(session_cookie.contains("HttpOnly"));
    let token = session_cookie
        .trim_start_matches(&format!("{SESSION_COOKIE}="))
        .split(';')
        .next()
        .unwrap();
    assert_eq!(session::read(token, TEST_SECRET), Some(phone("5551234567")));

    let json = body_json(response).await;
    assert_eq!(json["phone"], "(555) 123-4567");
}

#[tokio::test]
async fn should_reject_wrong_code_with_error_body() {
    let (_clock, stores) = memory_stores();
    let code = stores.challenges.issue(&phone("5551234567")).await.unwrap();
    let wrong = if code == "100000" { "100001" } else { "100000" };

    let response = app(&stores)
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            serde_json::json!({ "phone": "5551234567", "code": wrong }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let json = body_json(response).await;
    assert_eq!(json["kind"], "INVALID_LOGIN_CODE");
    assert_eq!(json["message"], "invalid login code");
}

#[tokio::test]
async fn should_reject_me_without_session() {
    let (_clock, stores) = memory_stores();

    let response = app(&stores)
        .oneshot(Request::get("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn should_reject_cookie_signed_with_another_secret() {
    let (_clock, stores) = memory_stores();
    let forged = MockSession::new("5551234567", "some-other-secret");

    let mut request = Request::post("/invites").body(Body::empty()).unwrap();
    *request.headers_mut() = forged.headers_with_csrf("anything");

    let response = app(&stores).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_clear_cookies_on_logout() {
    let (_clock, stores) = memory_stores();
    let session = MockSession::new("5551234567", TEST_SECRET);

    let mut request = Request::delete("/auth/session").body(Body::empty()).unwrap();
    *request.headers_mut() = session.headers();

    let response = app(&stores).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with(&format!("{SESSION_COOKIE}=;")) && c.contains("Max-Age=0"))
    );
    assert!(cookies.iter().any(|c| c.starts_with("view_as_member=;")));
}
