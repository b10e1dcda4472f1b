//! In-memory reference implementations of the storage traits.
//!
//! `MemoryRevocationStore` mirrors the semantics of the Redis backend closely
//! enough to stand in for it in tests and single-process deployments: entries
//! carry an absolute deadline and reads treat anything past its deadline as
//! absent (evicting it lazily on the way out).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::AuthResult;

use super::revocation::RevocationStore;
use super::user::{NewUser, User, UserStore};

// =============================================================================
// Revocation Store
// =============================================================================

/// In-memory revocation store with lazy expiry.
#[derive(Default)]
pub struct MemoryRevocationStore {
    /// jti -> absolute deadline after which the record no longer applies.
    revoked: DashMap<String, Instant>,
}

impl MemoryRevocationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) records; expired entries still pending
    /// eviction are not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.revoked.iter().filter(|e| *e.value() > now).count()
    }

    /// Returns `true` if no live records exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: &str, ttl: Duration) -> AuthResult<()> {
        if ttl.is_zero() {
            // Credential already expired; nothing to protect.
            return Ok(());
        }
        self.revoked.insert(jti.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> AuthResult<bool> {
        match self.revoked.get(jti) {
            Some(deadline) if *deadline > Instant::now() => Ok(true),
            Some(deadline) => {
                drop(deadline);
                self.revoked.remove(jti);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// User Store
// =============================================================================

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<i64, User>,
    by_username: DashMap<String, i64>,
    by_email: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            by_username: DashMap::new(),
            by_email: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Reserve the username first; the entry acts as the uniqueness lock.
        match self.by_username.entry(user.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(AuthError::UsernameTaken),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(id);
            }
        }
        match self.by_email.entry(user.email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                self.by_username.remove(&user.username);
                return Err(AuthError::EmailTaken);
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(id);
            }
        }

        let record = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            nickname: user.nickname,
            avatar_url: String::new(),
            grade_level: 0,
            birth_date: None,
            gender: String::new(),
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
        };
        self.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let Some(id) = self.by_username.get(username).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        match self.users.get_mut(&user.id) {
            Some(mut entry) => {
                *entry = user.clone();
                Ok(())
            }
            None => Err(AuthError::UserNotFound),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
