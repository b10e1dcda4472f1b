//! Token issuance and revocation service.
//!
//! `TokenService` composes the JWT service with a revocation store: login
//! calls [`TokenService::issue`], logout calls [`TokenService::revoke`], and
//! the admission path calls [`TokenService::verify`]. The revocation lifetime
//! is always the credential's remaining validity at the moment of revocation,
//! so a record self-destructs exactly when the credential it shadows would
//! have expired anyway.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::storage::RevocationStore;

use super::jwt::{AccessTokenClaims, JwtService};

/// A freshly issued credential together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed token string handed to the client.
    pub token: String,

    /// The claims embedded in it.
    pub claims: AccessTokenClaims,
}

/// Service for issuing, verifying and revoking access credentials.
#[derive(Clone)]
pub struct TokenService {
    jwt: Arc<JwtService>,
    revocations: Arc<dyn RevocationStore>,
    token_ttl: Duration,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        jwt: Arc<JwtService>,
        revocations: Arc<dyn RevocationStore>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            jwt,
            revocations,
            token_ttl,
        }
    }

    /// Issues a credential for `user_id` with a fresh jti.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn issue(&self, user_id: i64, role: &str) -> AuthResult<IssuedToken> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessTokenClaims {
            jti: Uuid::new_v4().to_string(),
            user_id,
            user_role: role.to_string(),
            iat: now,
            exp: now + self.token_ttl.as_secs() as i64,
        };
        let token = self.jwt.encode(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    /// Fully verifies a credential: algorithm, signature, expiry, claim shape.
    ///
    /// Revocation is *not* checked here; that is the admission layer's call,
    /// because it owns the policy for store failures.
    ///
    /// # Errors
    /// Returns the verification failure.
    pub fn verify(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        Ok(self.jwt.decode(token)?)
    }

    /// Revokes a credential at logout.
    ///
    /// The claims are extracted without signature or expiry validation: an
    /// already-expired token needs no revocation record (no-op success), and
    /// there is no point refusing to blacklist a token we would reject
    /// anyway. The record's lifetime is the credential's remaining validity,
    /// never longer.
    ///
    /// # Errors
    /// Returns `MalformedCredential` if no claims can be extracted, or a
    /// store error if the revocation write fails.
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let claims = self.jwt.peek_unverified(token)?;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let remaining = claims.remaining_validity(now);
        if remaining <= 0 {
            tracing::debug!(jti = %claims.jti, "token already expired, skipping revocation");
            return Ok(());
        }

        self.revocations
            .revoke(&claims.jti, Duration::from_secs(remaining as u64))
            .await?;
        tracing::info!(jti = %claims.jti, ttl_secs = remaining, "credential revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRevocationStore;

    fn service_with_store() -> (TokenService, Arc<MemoryRevocationStore>) {
        let store = Arc::new(MemoryRevocationStore::new());
        let service = TokenService::new(
            Arc::new(JwtService::new("test-secret")),
            store.clone(),
            Duration::from_secs(3600),
        );
        (service, store)
    }

    #[tokio::test]
    async fn issue_then_verify() {
        let (service, _) = service_with_store();

        let issued = service.issue(42, "user").unwrap();
        let claims = service.verify(&issued.token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.user_role, "user");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.jti.is_empty());
    }

    #[tokio::test]
    async fn each_issuance_gets_a_fresh_jti() {
        let (service, _) = service_with_store();

        let a = service.issue(1, "user").unwrap();
        let b = service.issue(1, "user").unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[tokio::test]
    async fn revoke_writes_remaining_validity() {
        let (service, store) = service_with_store();

        let issued = service.issue(42, "user").unwrap();
        service.revoke(&issued.token).await.unwrap();

        assert!(store.is_revoked(&issued.claims.jti).await.unwrap());
    }

    #[tokio::test]
    async fn revoking_expired_token_is_a_noop() {
        let store = Arc::new(MemoryRevocationStore::new());
        let jwt = Arc::new(JwtService::new("test-secret"));
        let service = TokenService::new(jwt.clone(), store.clone(), Duration::from_secs(3600));

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessTokenClaims {
            jti: "expired-jti".to_string(),
            user_id: 1,
            user_role: "user".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jwt.encode(&claims).unwrap();

        service.revoke(&token).await.unwrap();
        assert!(!store.is_revoked("expired-jti").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn revoking_twice_succeeds() {
        let (service, store) = service_with_store();

        let issued = service.issue(42, "user").unwrap();
        service.revoke(&issued.token).await.unwrap();
        service.revoke(&issued.token).await.unwrap();

        assert!(store.is_revoked(&issued.claims.jti).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn revoking_garbage_is_malformed() {
        let (service, _) = service_with_store();
        let err = service.revoke("garbage").await.unwrap_err();
        assert!(matches!(err, crate::AuthError::MalformedCredential { .. }));
    }
}
