//! # portico-gateway
//!
//! Authenticating reverse proxy for the Portico services.
//!
//! Every inbound request passes the admission gate (public-path bypass or
//! credential verification plus revocation check, failing closed on store
//! trouble), picks up gateway-derived trust headers, and is forwarded to the
//! upstream selected by longest-prefix route matching. Responses stream back
//! unmodified.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod proxy;
pub mod router;
pub mod server;

pub use config::{AppConfig, GatewayConfig, RedisConfig, RouteConfig, ServerConfig, load_config};
pub use error::GatewayError;
pub use observability::{init_tracing, init_tracing_with_level};
pub use router::{Route, RouteTable};
pub use server::{AppState, GatewayServer, ServerBuilder, build_app};
