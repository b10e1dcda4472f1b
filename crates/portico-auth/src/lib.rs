//! # portico-auth
//!
//! Credential handling for the Portico gateway and its upstream services.
//!
//! This crate provides:
//! - Signed access credential encoding and verification (HS256 JWT)
//! - Token issuance and logout-time revocation
//! - Storage traits for revocation records and user persistence
//! - In-memory reference implementations of both stores
//! - Password hashing for the user service
//!
//! ## Modules
//!
//! - [`config`] - Credential configuration (signing secret, token lifetime)
//! - [`token`] - Token encoding, verification, issuance and revocation
//! - [`storage`] - Storage traits and in-memory backends
//! - [`password`] - Argon2id password hashing
//! - [`error`] - Error taxonomy shared across the auth surface

pub mod config;
pub mod error;
pub mod password;
pub mod storage;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use storage::{
    MemoryRevocationStore, MemoryUserStore, NewUser, RevocationStore, User, UserStore, UserUpdate,
};
pub use token::jwt::{AccessTokenClaims, JwtError, JwtService};
pub use token::service::{IssuedToken, TokenService};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
