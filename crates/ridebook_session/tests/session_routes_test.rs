// --- File: crates/ridebook_session/tests/session_routes_test.rs ---
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use chrono::{Duration, Utc};
use ridebook_common::SessionCredential;
use ridebook_config::SessionConfig;
use ridebook_platform::mock::{MockFault, MockPlatform, Operation};
use ridebook_session::store::encode_credential;
use ridebook_session::{routes, CookiePolicy, SessionContext};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn context(mock: &Arc<MockPlatform>) -> SessionContext {
    SessionContext::new(mock.clone(), &SessionConfig::default())
}

fn cookie_for(credential: &SessionCredential) -> String {
    let key = CookiePolicy::default().signing_key;
    format!("ridebook_session={}", encode_credential(credential, &key).unwrap())
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn logout_replaces_member_with_visitor_cookie() {
    let mock = Arc::new(MockPlatform::new());
    let member = SessionCredential::member("member-tok", Some(Utc::now() + Duration::hours(1)));

    let response = routes(context(&mock))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/session/logout")
                .header(header::COOKIE, cookie_for(&member))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("ridebook_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["authenticated"], false);
    assert_eq!(body["kind"], "visitor");
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn active_member_session_is_left_alone() {
    let mock = Arc::new(MockPlatform::new());
    let member = SessionCredential::member("member-tok", Some(Utc::now() + Duration::hours(1)));

    let response = routes(context(&mock))
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::COOKIE, cookie_for(&member))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = json_body(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["kind"], "member");
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn session_status_fails_open_when_issuance_fails() {
    let mock = Arc::new(MockPlatform::new());
    mock.fail(Operation::IssueToken, MockFault::Network);

    let response = routes(context(&mock))
        .oneshot(Request::builder().uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = json_body(response).await;
    assert_eq!(body["authenticated"], false);
    assert!(body.get("kind").is_none());
}
