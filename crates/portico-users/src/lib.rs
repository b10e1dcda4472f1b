//! # portico-users
//!
//! User service behind the Portico gateway: registration, login (credential
//! issuance), logout (revocation) and profile read/update.
//!
//! Identity on protected endpoints comes exclusively from the gateway's
//! `X-User-ID`/`X-User-Role` headers: the gateway is the only path to this
//! service and the only writer of those header names, which is the whole
//! trust contract.

pub mod config;
pub mod handlers;
pub mod observability;
pub mod response;
pub mod server;
pub mod service;

pub use config::{AppConfig, load_config};
pub use server::{AppState, ServerBuilder, UsersServer, build_app};
pub use service::UserService;
