//! Admission gate and request-id middleware.
//!
//! The admission gate decides, per request, whether to forward at all:
//! public paths bypass verification; everything else needs a Bearer
//! credential that verifies against the configured key and has no active
//! revocation record. Rejections answer 401 with a stable reason code.
//!
//! Trust headers (`X-User-ID`, `X-User-Role`) are part of the wire contract
//! with the upstream services: the gateway is the only writer of these names.
//! Client-supplied copies are stripped on every path, public bypasses
//! included, and the gateway's own values are inserted only after a
//! credential is admitted, so downstream services never see a
//! client-controlled value under these names.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use portico_auth::{AccessTokenClaims, AuthError};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::server::AppState;

/// Trusted identity header written by the gateway.
pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// Trusted role header written by the gateway.
pub const X_USER_ROLE: HeaderName = HeaderName::from_static("x-user-role");

// =============================================================================
// Admission Gate
// =============================================================================

/// Admission middleware.
///
/// State machine per request:
/// `Unchecked → {PublicBypass | Verifying} → {Admitted | Rejected}`.
pub async fn admission(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Never let client-supplied trust headers through, admitted or not.
    req.headers_mut().remove(&X_USER_ID);
    req.headers_mut().remove(&X_USER_ROLE);

    let path = req.uri().path().to_string();
    if state.public_paths.contains(&path) {
        tracing::debug!(path = %path, "public path, admission bypassed");
        return next.run(req).await;
    }

    let claims = match verify_request(&state, req.headers()).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(path = %path, code = %err.code(), "request rejected");
            return GatewayError::Admission(err).into_response();
        }
    };

    // Identity context derived from the verified claims, nothing else.
    let user_id = HeaderValue::from_str(&claims.user_id.to_string())
        .expect("numeric string is a valid header value");
    let user_role = match HeaderValue::from_str(&claims.user_role) {
        Ok(value) => value,
        Err(_) => {
            return GatewayError::Admission(AuthError::malformed(
                "role claim is not header-safe",
            ))
            .into_response();
        }
    };
    req.headers_mut().insert(X_USER_ID, user_id);
    req.headers_mut().insert(X_USER_ROLE, user_role);

    tracing::debug!(
        path = %path,
        user_id = claims.user_id,
        role = %claims.user_role,
        "request admitted"
    );

    next.run(req).await
}

/// Verifies the request's credential and checks revocation.
///
/// Header/scheme problems reject before the credential is decoded, and
/// decoding problems reject before the store is consulted, so no store call
/// is ever made for syntactically invalid input.
async fn verify_request(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AccessTokenClaims, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::malformed("authorization header is not a Bearer credential"))?;

    let claims = state.jwt.decode(token)?;

    // Fail closed: a revocation check that cannot complete rejects the
    // request, because failing open would silently defeat logout guarantees.
    match state.revocations.is_revoked(&claims.jti).await {
        Ok(true) => {
            tracing::info!(jti = %claims.jti, "revoked credential presented");
            Err(AuthError::RevokedCredential)
        }
        Ok(false) => Ok(claims),
        Err(err) => {
            tracing::error!(error = %err, jti = %claims.jti, "revocation check failed, rejecting");
            Err(err)
        }
    }
}

// =============================================================================
// Other Middleware
// =============================================================================

// Middleware that ensures each request has an X-Request-Id and mirrors it on the response
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // If the incoming request already has a request-id, preserve it; otherwise generate one
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .expect("uuid string is a valid header value")
        });

    // Add to request extensions for downstream usage (e.g., logging)
    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    // Add/propagate the request id header to response
    res.headers_mut().insert(header_name, req_id_value);

    res
}

