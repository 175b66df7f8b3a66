//! In-process checks of the HTTP surface: public routes respond and
//! the bearer-auth layer gates everything else. No database required;
//! requests are driven straight into the router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use voicedesk_api::auth::{issue_token_with, Identity};
use voicedesk_api::server;

const JWT_SECRET: &str = "integration-test-secret";

fn set_test_secret() {
    // Safe to call from several tests: always the same value, and the
    // config singleton snapshots it on first access.
    std::env::set_var("JWT_SECRET", JWT_SECRET);
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn root_is_public_and_enveloped() {
    set_test_secret();
    let app = server::app();

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"]["name"], "VoiceDesk API");
}

#[tokio::test]
async fn protected_route_rejects_missing_token() {
    set_test_secret();
    let app = server::app();

    let response = app
        .oneshot(
            Request::get("/api/tenant/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_route_rejects_non_bearer_scheme() {
    set_test_secret();
    let app = server::app();

    let response = app
        .oneshot(
            Request::get("/api/auth/whoami")
                .header("authorization", "Basic dXNlcjpwdw==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized_with_expired_message() {
    set_test_secret();
    let app = server::app();

    let token = issue_token_with(Identity::SuperAdmin { admin_id: 1 }, JWT_SECRET, -60).unwrap();
    let response = app
        .oneshot(
            Request::get("/api/auth/whoami")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn whoami_echoes_verified_claims() {
    set_test_secret();
    let app = server::app();

    let token = issue_token_with(
        Identity::Impersonation {
            admin_id: 3,
            tenant_id: 2,
        },
        JWT_SECRET,
        3600,
    )
    .unwrap();
    let response = app
        .oneshot(
            Request::get("/api/auth/whoami")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"]["id"], 3);
    assert_eq!(body["data"]["tenant_id"], 2);
    assert_eq!(body["data"]["impersonator_id"], 3);
    assert_eq!(body["data"]["impersonating"], Value::Bool(true));
}
