//! Application state, router assembly and server lifecycle.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use portico_auth::{JwtService, RevocationStore};

use crate::config::AppConfig;
use crate::error::GatewayError;
use crate::router::RouteTable;
use crate::{handlers, middleware as gw_middleware, proxy};

/// Shared per-process state.
///
/// The verifier key and the revocation store are injected here at
/// construction; nothing in the request path reaches for process-wide
/// singletons.
#[derive(Clone)]
pub struct AppState {
    /// Credential verifier.
    pub jwt: Arc<JwtService>,

    /// Revocation store consulted on every admitted request.
    pub revocations: Arc<dyn RevocationStore>,

    /// Static route table.
    pub routes: Arc<RouteTable>,

    /// Shared client for upstream calls.
    pub http: reqwest::Client,

    /// Exact-match paths admitted without a credential.
    pub public_paths: Arc<HashSet<String>>,

    /// Maximum forwarded request body size.
    pub body_limit: usize,

    /// Crate version reported by the health endpoint.
    pub version: &'static str,
}

impl AppState {
    /// Builds state from configuration and an injected revocation store.
    ///
    /// # Errors
    /// Returns an error if the upstream HTTP client cannot be constructed.
    pub fn from_config(
        cfg: &AppConfig,
        revocations: Arc<dyn RevocationStore>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.gateway.upstream_timeout)
            .build()?;

        Ok(Self {
            jwt: Arc::new(JwtService::new(&cfg.auth.secret)),
            revocations,
            routes: Arc::new(RouteTable::new(&cfg.gateway.routes)),
            http,
            public_paths: Arc::new(cfg.gateway.public_paths.iter().cloned().collect()),
            body_limit: cfg.server.body_limit_bytes,
            version: env!("CARGO_PKG_VERSION"),
        })
    }
}

/// Dispatches an admitted request to its upstream.
///
/// Registered as the router fallback: every path that is not one of the
/// gateway's own endpoints lands here.
async fn dispatch(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let path = request.uri().path();
    let Some(route) = state.routes.match_route(path) else {
        tracing::debug!(path = %path, "no matching route");
        return Err(GatewayError::NoRoute {
            path: path.to_string(),
        });
    };
    let route = route.clone();
    proxy::forward(&state, &route, request).await
}

/// Assembles the gateway router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .fallback(dispatch)
        // Admission runs inside request-id/trace, outside dispatch.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gw_middleware::admission,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(gw_middleware::request_id))
        .with_state(state)
}

pub struct GatewayServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    revocations: Option<Arc<dyn RevocationStore>>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            addr: config.addr(),
            config,
            revocations: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Injects the revocation store implementation.
    pub fn with_revocation_store(mut self, store: Arc<dyn RevocationStore>) -> Self {
        self.revocations = Some(store);
        self
    }

    pub fn build(self) -> anyhow::Result<GatewayServer> {
        let revocations = self
            .revocations
            .ok_or_else(|| anyhow::anyhow!("a revocation store is required"))?;
        let state = AppState::from_config(&self.config, revocations)?;
        let app = build_app(state);

        Ok(GatewayServer {
            addr: self.addr,
            app,
        })
    }
}

impl GatewayServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
