//! Application state, router assembly and server lifecycle.

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::service::UserService;

/// Shared per-process state.
#[derive(Clone)]
pub struct AppState {
    /// User business logic.
    pub service: UserService,

    /// Crate version reported by the health endpoint.
    pub version: &'static str,
}

impl AppState {
    #[must_use]
    pub fn new(service: UserService) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Assembles the user service router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/users/register", post(handlers::register))
        .route("/api/v1/users/login", post(handlers::login))
        .route("/api/v1/users/logout", post(handlers::logout))
        .route(
            "/api/v1/users/me",
            get(handlers::me).put(handlers::update_me),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct UsersServer {
    addr: SocketAddr,
    app: Router,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    service: UserService,
}

impl ServerBuilder {
    pub fn new(addr: SocketAddr, service: UserService) -> Self {
        Self { addr, service }
    }

    pub fn build(self) -> UsersServer {
        let app = build_app(AppState::new(self.service));
        UsersServer {
            addr: self.addr,
            app,
        }
    }
}

impl UsersServer {
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
