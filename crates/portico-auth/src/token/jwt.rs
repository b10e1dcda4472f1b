//! JWT access credential encoding and verification.
//!
//! Credentials are signed with a single symmetric key and a single fixed
//! algorithm (HS256). Verification pins the algorithm from configuration and
//! checks the token header against it *before* the secret is used, so a token
//! carrying any other algorithm is rejected outright rather than being
//! interpreted under a substituted scheme.
//!
//! ## Example
//!
//! ```ignore
//! use portico_auth::token::jwt::{AccessTokenClaims, JwtService};
//!
//! let service = JwtService::new("secret");
//! let token = service.encode(&claims)?;
//! let claims = service.decode(&token)?;
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// The token is not structurally valid: bad segments, bad base64,
    /// undecodable claims, or a required claim is missing.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of why the token is malformed.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid, or the token was signed with an
    /// algorithm other than the configured one.
    #[error("Invalid signature")]
    InvalidSignature,
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => Self::InvalidSignature,
            _ => Self::malformed(err.to_string()),
        }
    }
}

impl From<JwtError> for crate::AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::ExpiredCredential,
            JwtError::InvalidSignature => Self::BadSignature,
            JwtError::Malformed { message } => Self::MalformedCredential { message },
            JwtError::EncodingError { message } => Self::Internal { message },
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Claims carried by an access credential.
///
/// The field names and types are the wire contract shared with every service
/// behind the gateway; all fields are required, and a token missing any of
/// them fails verification as malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Unique identifier of this issuance (the revocation key).
    pub jti: String,

    /// Authenticated user's identity.
    pub user_id: i64,

    /// Authenticated user's role.
    pub user_role: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Remaining validity in whole seconds at `now`; negative once expired.
    #[must_use]
    pub fn remaining_validity(&self, now: i64) -> i64 {
        self.exp - now
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for encoding and verifying access credentials.
///
/// Thread-safe (`Send + Sync`); share it across tasks behind an `Arc`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtService {
    /// Creates a new JWT service over a shared symmetric secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encodes claims into a signed token string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and fully verifies a token: algorithm, signature, expiry and
    /// claim shape.
    ///
    /// The header's algorithm is compared against the configured one before
    /// the secret is consulted; a mismatch is reported as `InvalidSignature`
    /// without attempting verification.
    ///
    /// # Errors
    /// Returns the specific verification failure.
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let header = decode_header(token)?;
        if header.alg != self.algorithm {
            return Err(JwtError::InvalidSignature);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Extracts claims without verifying signature or expiry.
    ///
    /// Only the logout path uses this: an expired or foreign-signed token
    /// still names the jti to revoke, and a token too broken to parse has
    /// nothing to revoke. The payload segment is decoded directly; the
    /// signature segment is never interpreted.
    ///
    /// # Errors
    /// Returns `Malformed` if the claims cannot be extracted at all.
    pub fn peek_unverified(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(JwtError::malformed("token does not have three segments")),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| JwtError::malformed(format!("claims are not valid base64url: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| JwtError::malformed(format!("claims are not a valid claim set: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
