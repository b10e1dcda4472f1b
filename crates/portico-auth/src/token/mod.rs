//! Token encoding, verification, issuance and revocation.

pub mod jwt;
pub mod service;

pub use jwt::{AccessTokenClaims, JwtError, JwtService};
pub use service::{IssuedToken, TokenService};
