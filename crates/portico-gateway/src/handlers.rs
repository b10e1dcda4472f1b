//! Gateway's own endpoints (everything else is proxied).

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::server::AppState;

/// Liveness endpoint served by the gateway itself.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "portico-gateway",
        "version": state.version,
    }))
}
