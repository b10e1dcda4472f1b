//! Pass-through forwarding to upstream services.
//!
//! The dispatcher forwards method, headers (minus hop-by-hop) and body to the
//! selected upstream's equivalent path, then streams the upstream response
//! back unmodified. There is no retry and no queueing here; if the client
//! hangs up mid-stream, the handler future is dropped and the in-flight
//! upstream call is cancelled with it.

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::router::Route;
use crate::server::AppState;

/// Forwards `request` to the upstream selected by `route`.
///
/// # Errors
/// Connection failures and timeouts surface as `Upstream` (502); they are
/// never retried here.
pub async fn forward(
    state: &AppState,
    route: &Route,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    let target_url = format!("{}{}", route.upstream, path_and_query);

    debug!(
        method = %request.method(),
        target_url = %target_url,
        "forwarding request"
    );

    let method = request.method().clone();

    // Copy headers, filtering out hop-by-hop headers
    let mut headers = HeaderMap::new();
    for (name, value) in request.headers() {
        if is_hop_by_hop_header(name.as_str()) {
            continue;
        }
        headers.insert(name.clone(), value.clone());
    }

    let body_bytes = axum::body::to_bytes(request.into_body(), state.body_limit)
        .await
        .map_err(|e| GatewayError::BadRequest(format!("failed to read request body: {e}")))?;

    let upstream_request = state
        .http
        .request(method, &target_url)
        .headers(headers)
        .body(body_bytes.to_vec())
        .build()
        .map_err(|e| GatewayError::Internal(format!("failed to build upstream request: {e}")))?;

    let upstream_response = state.http.execute(upstream_request).await.map_err(|e| {
        warn!(target_url = %target_url, error = %e, "upstream request failed");
        if e.is_timeout() {
            GatewayError::Upstream(format!("request to {target_url} timed out"))
        } else if e.is_connect() {
            GatewayError::Upstream(format!("failed to connect to {target_url}: {e}"))
        } else {
            GatewayError::Upstream(format!("request to {target_url} failed: {e}"))
        }
    })?;

    let status = upstream_response.status();
    debug!(status = %status, "upstream responded");

    let mut builder = Response::builder().status(status);
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop_header(name.as_str()) {
            builder = builder.header(name, value);
        }
    }

    // Stream the body through rather than buffering it; large or slow
    // responses flow at the upstream's pace and cancel with the client.
    builder
        .body(Body::from_stream(upstream_response.bytes_stream()))
        .map_err(|e| GatewayError::Internal(format!("failed to build response: {e}")))
}

/// Checks if a header is a hop-by-hop header that should not be forwarded.
///
/// Hop-by-hop headers are defined in RFC 2616 Section 13.5.1.
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
            | "host" // Host should be set to target, not forwarded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hop_by_hop_header() {
        assert!(is_hop_by_hop_header("Connection"));
        assert!(is_hop_by_hop_header("Transfer-Encoding"));
        assert!(is_hop_by_hop_header("host"));
        assert!(!is_hop_by_hop_header("Content-Type"));
        assert!(!is_hop_by_hop_header("Authorization"));
        assert!(!is_hop_by_hop_header("X-User-ID"));
    }
}
