//! End-to-end user flows: register, login, profile, logout-revocation.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use portico_auth::{
    JwtService, MemoryRevocationStore, MemoryUserStore, RevocationStore, TokenService,
};
use portico_users::server::{AppState, build_app};
use portico_users::service::UserService;

const SECRET: &str = "users-flow-secret";

fn test_app() -> (axum::Router, Arc<MemoryRevocationStore>, Arc<JwtService>) {
    let revocations = Arc::new(MemoryRevocationStore::new());
    let jwt = Arc::new(JwtService::new(SECRET));
    let tokens = TokenService::new(jwt.clone(), revocations.clone(), Duration::from_secs(3600));
    let service = UserService::new(Arc::new(MemoryUserStore::new()), tokens);
    (build_app(AppState::new(service)), revocations, jwt)
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
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register_alice(app: &axum::Router) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/register",
            serde_json::json!({
                "username": "alice",
                "password": "password1",
                "email": "alice@example.com",
                "nickname": "Alice",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn login_alice(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/login",
            serde_json::json!({"username": "alice", "password": "password1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_returns_safe_view() {
    let (app, _, _) = test_app();

    let body = register_alice(&app).await;
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    // No password material in the response, hashed or otherwise.
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _, _) = test_app();
    register_alice(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/register",
            serde_json::json!({
                "username": "alice",
                "password": "password2",
                "email": "alice2@example.com",
                "nickname": "Alice2",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], 409);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn short_username_is_rejected() {
    let (app, _, _) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/register",
            serde_json::json!({
                "username": "al",
                "password": "password1",
                "email": "al@example.com",
                "nickname": "Al",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_verifiable_credential() {
    let (app, _, jwt) = test_app();
    register_alice(&app).await;

    let token = login_alice(&app).await;
    let claims = jwt.decode(&token).unwrap();
    assert_eq!(claims.user_role, "user");
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let (app, _, _) = test_app();
    register_alice(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users/login",
            serde_json::json!({"username": "alice", "password": "wrong-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_gateway_identity() {
    let (app, _, _) = test_app();
    register_alice(&app).await;

    // Without the gateway's trust headers the request is anonymous.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_and_update_me_with_gateway_identity() {
    let (app, _, jwt) = test_app();
    let registered = register_alice(&app).await;
    let token = login_alice(&app).await;
    let user_id = jwt.decode(&token).unwrap().user_id;
    assert_eq!(registered["data"]["id"], user_id);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header("X-User-ID", user_id.to_string())
                .header("X-User-Role", "user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"]["last_login_at"].is_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/users/me")
                .header("X-User-ID", user_id.to_string())
                .header("X-User-Role", "user")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"nickname": "Allie", "grade_level": 7}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["nickname"], "Allie");
    assert_eq!(body["data"]["grade_level"], 7);
    assert_eq!(body["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn logout_writes_revocation_record() {
    let (app, revocations, jwt) = test_app();
    register_alice(&app).await;
    let token = login_alice(&app).await;
    let jti = jwt.decode(&token).unwrap().jti;

    assert!(!revocations.is_revoked(&jti).await.unwrap());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The record is live immediately; the gateway would now reject this jti.
    assert!(revocations.is_revoked(&jti).await.unwrap());
}

#[tokio::test]
async fn logout_without_header_is_bad_request() {
    let (app, _, _) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
