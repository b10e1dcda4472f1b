//! Gateway-specific error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portico_auth::AuthError;
use serde_json::json;
use std::fmt;

/// Gateway-specific errors.
///
/// Every variant renders as `{"code": <stable reason>, "message": <text>}`;
/// the `code` values are the wire contract, the messages are not.
#[derive(Debug)]
pub enum GatewayError {
    /// The admission gate rejected the request: missing/malformed/expired/
    /// revoked credential, or revocation store trouble (which rejects too,
    /// because the gate fails closed).
    Admission(AuthError),

    /// No route prefix matches the request path.
    NoRoute {
        /// The path that matched nothing.
        path: String,
    },

    /// The selected upstream could not be reached or timed out.
    Upstream(String),

    /// The inbound request could not be read.
    BadRequest(String),

    /// Generic internal error.
    Internal(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admission(err) => write!(f, "Admission rejected: {err}"),
            Self::NoRoute { path } => write!(f, "No route found for {path}"),
            Self::Upstream(msg) => write!(f, "Upstream error: {msg}"),
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// Stable machine-readable reason code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Admission(err) => err.code(),
            Self::NoRoute { .. } => "no_route",
            Self::Upstream(_) => "upstream_unavailable",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Client-facing message. Internal detail (store addresses, upstream
    /// error chains) stays in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Admission(AuthError::Store { .. }) => "revocation check unavailable".to_string(),
            Self::Admission(err) => err.to_string(),
            Self::NoRoute { path } => format!("no route found for {path}"),
            Self::Upstream(_) => "upstream unavailable".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Every admission rejection answers 401 with a reason code,
            // including store trouble: the gate trades availability for the
            // integrity of the revocation guarantee.
            Self::Admission(_) => StatusCode::UNAUTHORIZED,
            Self::NoRoute { .. } => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "code": self.code(),
            "message": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for GatewayError {
    fn from(err: AuthError) -> Self {
        Self::Admission(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes() {
        assert_eq!(
            GatewayError::Admission(AuthError::MissingCredential).code(),
            "missing_credential"
        );
        assert_eq!(
            GatewayError::Admission(AuthError::RevokedCredential).code(),
            "revoked_credential"
        );
        assert_eq!(
            GatewayError::Admission(AuthError::store("down")).code(),
            "store_unavailable"
        );
        assert_eq!(GatewayError::NoRoute { path: "/x".into() }.code(), "no_route");
        assert_eq!(
            GatewayError::Upstream("refused".into()).code(),
            "upstream_unavailable"
        );
    }

    #[test]
    fn store_detail_is_not_exposed() {
        let err = GatewayError::Admission(AuthError::store("redis://10.0.0.3 refused"));
        assert!(!err.public_message().contains("10.0.0.3"));
    }

    #[test]
    fn upstream_detail_is_not_exposed() {
        let err = GatewayError::Upstream("connect to 192.168.1.7:9000 refused".into());
        assert!(!err.public_message().contains("192.168"));
    }
}
