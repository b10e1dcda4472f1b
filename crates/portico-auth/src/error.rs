//! Error taxonomy for credential handling.
//!
//! Every rejection carries a stable machine-readable code (see [`AuthError::code`])
//! distinct from the human-readable message, so clients can branch on the reason
//! without parsing prose and without the server leaking internal detail.

/// Errors that can occur while verifying, issuing or revoking credentials,
/// or while operating on the auth-related stores.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented where one is required.
    #[error("Missing credential")]
    MissingCredential,

    /// The credential (or its transport header) could not be parsed.
    #[error("Malformed credential: {message}")]
    MalformedCredential {
        /// Description of why the credential is malformed.
        message: String,
    },

    /// The credential's signature did not verify against the configured key,
    /// or its signing algorithm is not the configured one.
    #[error("Bad signature")]
    BadSignature,

    /// The credential has passed its expiry time.
    #[error("Credential expired")]
    ExpiredCredential,

    /// The credential's jti carries an active revocation record.
    #[error("Credential revoked")]
    RevokedCredential,

    /// A backing store could not be reached or failed mid-operation.
    ///
    /// This is deliberately distinct from any "not found"/"not revoked"
    /// answer: the store reports truth or error, never one for the other.
    #[error("Store error: {message}")]
    Store {
        /// Description of the store failure.
        message: String,
    },

    /// Username/password pair did not authenticate.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Registration attempted with a username that already exists.
    #[error("Username already taken")]
    UsernameTaken,

    /// Registration attempted with an email that already exists.
    #[error("Email already registered")]
    EmailTaken,

    /// No user record for the requested identity.
    #[error("User not found")]
    UserNotFound,

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `MalformedCredential` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCredential {
            message: message.into(),
        }
    }

    /// Creates a new `Store` error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable reason code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential { .. } => "malformed_credential",
            Self::BadSignature => "bad_signature",
            Self::ExpiredCredential => "expired_credential",
            Self::RevokedCredential => "revoked_credential",
            Self::Store { .. } => "store_unavailable",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UsernameTaken => "username_taken",
            Self::EmailTaken => "email_taken",
            Self::UserNotFound => "user_not_found",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Returns `true` if this error rejects the presented credential itself
    /// (as opposed to store or server trouble).
    #[must_use]
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::MalformedCredential { .. }
                | Self::BadSignature
                | Self::ExpiredCredential
                | Self::RevokedCredential
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AuthError::MissingCredential.code(), "missing_credential");
        assert_eq!(AuthError::malformed("x").code(), "malformed_credential");
        assert_eq!(AuthError::BadSignature.code(), "bad_signature");
        assert_eq!(AuthError::ExpiredCredential.code(), "expired_credential");
        assert_eq!(AuthError::RevokedCredential.code(), "revoked_credential");
        assert_eq!(AuthError::store("down").code(), "store_unavailable");
    }

    #[test]
    fn credential_rejection_predicate() {
        assert!(AuthError::BadSignature.is_credential_rejection());
        assert!(AuthError::RevokedCredential.is_credential_rejection());
        assert!(!AuthError::store("down").is_credential_rejection());
        assert!(!AuthError::internal("boom").is_credential_rejection());
    }

    #[test]
    fn messages_do_not_leak_store_detail_in_code() {
        let err = AuthError::store("redis://10.0.0.3:6379 timed out");
        // The stable code is what rejections expose; the message stays server-side.
        assert_eq!(err.code(), "store_unavailable");
    }
}
