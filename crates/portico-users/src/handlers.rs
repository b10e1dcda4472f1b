//! HTTP handlers and request/response DTOs.

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};

use portico_auth::{User, UserUpdate};

use crate::response::{ApiError, error, success};
use crate::server::AppState;

time::serde::format_description!(date_ymd, Date, "[year]-[month]-[day]");

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub nickname: String,
}

impl RegisterRequest {
    /// Field validation mirroring the public API contract.
    fn validate(&self) -> Result<(), String> {
        let username_len = self.username.chars().count();
        if !(4..=20).contains(&username_len) {
            return Err("username must be 4-20 characters".into());
        }
        let password_len = self.password.chars().count();
        if !(6..=30).contains(&password_len) {
            return Err("password must be 6-30 characters".into());
        }
        if !self.email.contains('@') {
            return Err("email must be a valid address".into());
        }
        let nickname_len = self.nickname.chars().count();
        if !(2..=20).contains(&nickname_len) {
            return Err("nickname must be 2-20 characters".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Safe user view for API responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
    pub avatar_url: String,
    pub grade_level: i32,
    #[serde(with = "date_ymd::option")]
    pub birth_date: Option<Date>,
    pub gender: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
            grade_level: user.grade_level,
            birth_date: user.birth_date,
            gender: user.gender.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

// =============================================================================
// Gateway Identity Extractor
// =============================================================================

/// Identity injected by the gateway's trust headers.
///
/// These headers are trusted precisely because the gateway is the sole path
/// to this service and overwrites any client-supplied copies. A request
/// without them did not come through the gateway's admitted path.
#[derive(Debug, Clone)]
pub struct GatewayIdentity {
    pub user_id: i64,
    pub role: String,
}

impl<S> FromRequestParts<S> for GatewayIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        match (user_id, role) {
            (Some(user_id), Some(role)) => Ok(Self { user_id, role }),
            _ => {
                tracing::debug!("request missing gateway identity headers");
                Err(error(StatusCode::UNAUTHORIZED, "missing identity context"))
            }
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/v1/users/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    if let Err(msg) = req.validate() {
        return error(StatusCode::BAD_REQUEST, msg);
    }

    match state
        .service
        .register(&req.username, &req.password, &req.email, &req.nickname)
        .await
    {
        Ok(user) => success(
            StatusCode::CREATED,
            RegisterResponse {
                id: user.id,
                username: user.username,
                email: user.email,
                nickname: user.nickname,
            },
        ),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `POST /api/v1/users/login`
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.service.login(&req.username, &req.password).await {
        Ok((issued, user)) => success(
            StatusCode::OK,
            LoginResponse {
                token: issued.token,
                user: UserResponse::from(&user),
            },
        ),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `POST /api/v1/users/logout`
///
/// Revokes the presented credential for its remaining validity. The header is
/// read directly (not via the gateway identity) so that logout also works for
/// an expired credential.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(authorization) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return error(StatusCode::BAD_REQUEST, "missing authorization header");
    };

    match state.service.logout(authorization).await {
        Ok(()) => success(StatusCode::OK, Value::Null),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `GET /api/v1/users/me`
pub async fn me(State(state): State<AppState>, identity: GatewayIdentity) -> Response {
    match state.service.me(identity.user_id).await {
        Ok(user) => success(StatusCode::OK, UserResponse::from(&user)),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `PUT /api/v1/users/me`
pub async fn update_me(
    State(state): State<AppState>,
    identity: GatewayIdentity,
    Json(update): Json<UserUpdate>,
) -> Response {
    match state.service.update_me(identity.user_id, update).await {
        Ok(user) => success(StatusCode::OK, UserResponse::from(&user)),
        Err(e) => ApiError(e).into_response(),
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    success(
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "service": "portico-users",
            "version": state.version,
        }),
    )
}
