//! User service business logic.

use std::sync::Arc;

use time::OffsetDateTime;

use portico_auth::{
    AuthError, AuthResult, IssuedToken, NewUser, TokenService, User, UserStore, UserUpdate,
    password,
};

/// Business logic over the user store and the token service.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Registers a new user with the default role.
    ///
    /// # Errors
    /// Returns `UsernameTaken`/`EmailTaken` on conflicts.
    pub async fn register(
        &self,
        username: &str,
        password_plain: &str,
        email: &str,
        nickname: &str,
    ) -> AuthResult<User> {
        let password_hash = password::hash_password(password_plain)?;
        let user = self
            .store
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                nickname: nickname.to_string(),
                role: "user".to_string(),
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticates a username/password pair and issues a credential.
    ///
    /// Unknown user and wrong password both answer `InvalidCredentials`;
    /// the response must not reveal which half was wrong.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` on authentication failure.
    pub async fn login(&self, username: &str, password_plain: &str) -> AuthResult<(IssuedToken, User)> {
        let Some(mut user) = self.store.find_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password_plain, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        user.last_login_at = Some(OffsetDateTime::now_utc());
        self.store.update(&user).await?;

        let issued = self.tokens.issue(user.id, &user.role)?;
        tracing::info!(user_id = user.id, jti = %issued.claims.jti, "user logged in");
        Ok((issued, user))
    }

    /// Logs out by revoking the presented credential.
    ///
    /// # Errors
    /// Returns `MalformedCredential` if the header is not a Bearer
    /// credential, or a store error if the revocation write fails.
    pub async fn logout(&self, authorization: &str) -> AuthResult<()> {
        let token = authorization
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AuthError::malformed("authorization header is not a Bearer credential")
            })?;
        self.tokens.revoke(token).await
    }

    /// Loads the profile of the authenticated user.
    ///
    /// # Errors
    /// Returns `UserNotFound` if the id is unknown.
    pub async fn me(&self, user_id: i64) -> AuthResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Applies a partial profile update and returns the new record.
    ///
    /// # Errors
    /// Returns `UserNotFound` if the id is unknown.
    pub async fn update_me(&self, user_id: i64, update: UserUpdate) -> AuthResult<User> {
        let mut user = self.me(user_id).await?;
        user.apply(&update);
        self.store.update(&user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_auth::{JwtService, MemoryRevocationStore, MemoryUserStore, RevocationStore};
    use std::time::Duration;

    fn service() -> (UserService, Arc<MemoryRevocationStore>) {
        let revocations = Arc::new(MemoryRevocationStore::new());
        let tokens = TokenService::new(
            Arc::new(JwtService::new("users-test-secret")),
            revocations.clone(),
            Duration::from_secs(3600),
        );
        (
            UserService::new(Arc::new(MemoryUserStore::new()), tokens),
            revocations,
        )
    }

    #[tokio::test]
    async fn register_login_roundtrip() {
        let (service, _) = service();

        let user = service
            .register("alice", "password1", "a@example.com", "Alice")
            .await
            .unwrap();
        assert_eq!(user.role, "user");

        let (issued, logged_in) = service.login("alice", "password1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.last_login_at.is_some());
        assert_eq!(issued.claims.user_id, user.id);
        assert_eq!(issued.claims.user_role, "user");
    }

    #[tokio::test]
    async fn login_failure_is_uniform() {
        let (service, _) = service();
        service
            .register("alice", "password1", "a@example.com", "Alice")
            .await
            .unwrap();

        let unknown_user = service.login("bob", "password1").await.unwrap_err();
        let wrong_password = service.login("alice", "nope-nope").await.unwrap_err();

        // Same error either way; the response must not say which was wrong.
        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_revokes_for_remaining_validity() {
        let (service, revocations) = service();
        service
            .register("alice", "password1", "a@example.com", "Alice")
            .await
            .unwrap();
        let (issued, _) = service.login("alice", "password1").await.unwrap();

        service
            .logout(&format!("Bearer {}", issued.token))
            .await
            .unwrap();
        assert!(revocations.is_revoked(&issued.claims.jti).await.unwrap());
    }

    #[tokio::test]
    async fn logout_requires_bearer_scheme() {
        let (service, _) = service();
        let err = service.logout("Token abc").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedCredential { .. }));
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let (service, _) = service();
        let user = service
            .register("alice", "password1", "a@example.com", "Alice")
            .await
            .unwrap();

        let updated = service
            .update_me(
                user.id,
                UserUpdate {
                    nickname: Some("Allie".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.nickname, "Allie");
        assert_eq!(updated.email, "a@example.com");
    }

    #[tokio::test]
    async fn me_unknown_user() {
        let (service, _) = service();
        assert!(matches!(
            service.me(404).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
