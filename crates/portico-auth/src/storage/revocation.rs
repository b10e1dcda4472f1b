//! Revocation record storage trait.
//!
//! A revocation record marks one issued credential (by jti) as no longer
//! trusted before its natural expiry. Records self-expire at the store level:
//! the lifetime passed to [`RevocationStore::revoke`] is the credential's
//! remaining validity, so a record never outlives the credential it revokes
//! and never lapses while that credential would still verify.
//!
//! # Security Considerations
//!
//! - Absence of a record means "not known revoked", not "guaranteed valid";
//!   revocation is opt-in denial, not an allow-list.
//! - Store failure must surface as an error, never as `false`. The admission
//!   layer decides policy (it fails closed); the store only reports truth.
//! - `revoke` and `is_revoked` must be atomic with respect to each other.
//!   Single-key operations on the backing store satisfy this without extra
//!   locking.

use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;

/// Storage trait for revocation records keyed by credential jti.
///
/// # Implementations
///
/// - [`crate::storage::MemoryRevocationStore`] - in-process reference store
/// - `portico-auth-redis` - Redis backend with native key expiry
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Inserts a revocation marker for `jti` that the store itself expires
    /// after `ttl` elapses.
    ///
    /// Callers compute `ttl` as the credential's remaining validity
    /// (`exp − now`). A zero `ttl` is a successful no-op: the credential has
    /// already expired and there is nothing left to protect.
    ///
    /// # Idempotency
    ///
    /// Revoking an already-revoked jti succeeds. Because every caller derives
    /// `ttl` from the same fixed `exp`, a repeat revoke cannot push the
    /// record's expiry past the credential's own.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke(&self, jti: &str, ttl: Duration) -> AuthResult<()>;

    /// Checks whether `jti` carries an active revocation record.
    ///
    /// This runs on every admitted request, so implementations must keep it
    /// fast and bounded: a slow or unreachable store should fail with an
    /// error promptly rather than hang the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. Implementations must
    /// not substitute `Ok(false)` for a failed lookup.
    async fn is_revoked(&self, jti: &str) -> AuthResult<bool>;
}
