//! User storage trait.
//!
//! Defines the interface for user persistence. The gateway core never touches
//! this; it exists for the user service, which consumes "persist user" as a
//! capability without owning a database engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::AuthResult;

time::serde::format_description!(date_ymd, Date, "[year]-[month]-[day]");

// =============================================================================
// User Types
// =============================================================================

/// A stored user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique numeric identity; this is the value carried in credentials.
    pub id: i64,

    /// Login name, unique across the store.
    pub username: String,

    /// Email, unique across the store.
    pub email: String,

    /// Password hash in PHC string format. Never serialized outward.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Display name.
    pub nickname: String,

    /// Avatar image URL, empty if unset.
    pub avatar_url: String,

    /// School grade level (1-12), 0 if unset.
    pub grade_level: i32,

    /// Birth date, if provided.
    #[serde(default, with = "date_ymd::option")]
    pub birth_date: Option<Date>,

    /// Gender, empty if unset.
    pub gender: String,

    /// Assigned role, e.g. "user" or "admin".
    pub role: String,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Last successful login, if any.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
}

/// Fields required to create a user; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: String,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub grade_level: Option<i32>,
    #[serde(default, with = "date_ymd::option")]
    pub birth_date: Option<Date>,
    pub gender: Option<String>,
}

impl User {
    /// Applies a partial update to this record.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(ref nickname) = update.nickname {
            self.nickname = nickname.clone();
        }
        if let Some(ref avatar_url) = update.avatar_url {
            self.avatar_url = avatar_url.clone();
        }
        if let Some(grade_level) = update.grade_level {
            self.grade_level = grade_level;
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(ref gender) = update.gender {
            self.gender = gender.clone();
        }
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage trait for user records.
///
/// # Implementations
///
/// - [`crate::storage::MemoryUserStore`] - in-process reference store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a user, assigning its id and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::UsernameTaken`] or
    /// [`crate::AuthError::EmailTaken`] on uniqueness conflicts, or a store
    /// error if persistence fails.
    async fn create(&self, user: NewUser) -> AuthResult<User>;

    /// Looks up a user by id.
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>>;

    /// Looks up a user by username.
    ///
    /// # Errors
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Persists an updated user record.
    ///
    /// # Errors
    /// Returns [`crate::AuthError::UserNotFound`] if the id is unknown.
    async fn update(&self, user: &User) -> AuthResult<()>;
}
