//! Uniform API response envelope.
//!
//! Every endpoint answers `{"code": <status>, "msg": <text>, "data": <value>}`
//! with `data` present (null on errors), so clients always parse one shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portico_auth::AuthError;
use serde::Serialize;
use serde_json::Value;

/// Standard JSON response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

/// Standard success response.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            code: status.as_u16(),
            msg: "ok".to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

/// Standard error response with a null `data` field.
pub fn error(status: StatusCode, msg: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            code: status.as_u16(),
            msg: msg.into(),
            data: None,
        }),
    )
        .into_response()
}

/// Wrapper rendering [`AuthError`] into the response envelope.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuthError::MissingCredential | AuthError::MalformedCredential { .. } => {
                StatusCode::BAD_REQUEST
            }
            AuthError::BadSignature
            | AuthError::ExpiredCredential
            | AuthError::RevokedCredential
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Store { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store and internal detail stays in the logs, not the body.
        let msg = match &self.0 {
            AuthError::Store { message } => {
                tracing::error!(error = %message, "store failure");
                "service temporarily unavailable".to_string()
            }
            AuthError::Internal { message } => {
                tracing::error!(error = %message, "internal error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        error(status, msg)
    }
}
