//! Bearer token issuing, lookup and revocation.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};

use crate::domain::entities::token::{PLAINTEXT_LEN, hash_plaintext};
use crate::domain::entities::{Token, TokenScope, User};
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::domain::validation::Validator;
use crate::error::AppError;
use crate::utils::token_generator::generate_plaintext;

/// Mints a token without persisting it.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails.
pub fn generate(user_id: i64, ttl: TimeDelta, scope: TokenScope) -> Result<Token, AppError> {
    let plaintext = generate_plaintext()?;
    let hash = hash_plaintext(&plaintext);

    Ok(Token {
        plaintext,
        hash,
        user_id,
        expiry: Utc::now() + ttl,
        scope,
    })
}

/// Records format violations of a client-supplied plaintext under `token`.
pub fn validate_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

/// Service for scoped, expiring bearer tokens.
///
/// Tokens are handed out as 26-character base32 plaintexts and stored only as
/// their SHA-256 hash.
pub struct TokenService<
    T: TokenRepository + ?Sized = dyn TokenRepository,
    U: UserRepository + ?Sized = dyn UserRepository,
> {
    tokens: Arc<T>,
    users: Arc<U>,
}

impl<T: TokenRepository + ?Sized, U: UserRepository + ?Sized> TokenService<T, U> {
    pub fn new(tokens: Arc<T>, users: Arc<U>) -> Self {
        Self { tokens, users }
    }

    /// Mints a token and stores its hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on randomness or database failure.
    pub async fn issue(
        &self,
        user_id: i64,
        ttl: TimeDelta,
        scope: TokenScope,
    ) -> Result<Token, AppError> {
        let token = generate(user_id, ttl, scope)?;
        self.tokens.insert(&token).await?;
        Ok(token)
    }

    /// Resolves a plaintext to the user owning a live token of `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown and expired tokens alike.
    pub async fn lookup(&self, scope: TokenScope, plaintext: &str) -> Result<User, AppError> {
        self.users
            .get_for_token(scope, hash_plaintext(plaintext))
            .await
    }

    /// Deletes every token of `user_id` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn revoke_all(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        self.tokens.delete_all_for_user(scope, user_id).await
    }

    /// Deletes every expired token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.tokens.delete_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockTokenRepository, MockUserRepository};
    use mockall::predicate::eq;

    type Service = TokenService<MockTokenRepository, MockUserRepository>;

    fn user() -> User {
        User {
            id: 5,
            created_at: Utc::now(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            password_hash: String::new(),
            activated: true,
            version: 1,
        }
    }

    #[test]
    fn test_generate() {
        let before = Utc::now();
        let token = generate(5, TimeDelta::hours(24), TokenScope::Authentication).unwrap();

        assert_eq!(token.plaintext.len(), PLAINTEXT_LEN);
        assert_eq!(token.hash, hash_plaintext(&token.plaintext));
        assert_eq!(token.hash.len(), 32);
        assert_eq!(token.user_id, 5);
        assert_eq!(token.scope, TokenScope::Authentication);
        assert!(token.expiry >= before + TimeDelta::hours(24));
        assert!(token.expiry <= Utc::now() + TimeDelta::hours(24));
    }

    #[tokio::test]
    async fn test_issue_persists_hash() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .withf(|t| t.user_id == 5 && t.scope == TokenScope::Activation && t.hash.len() == 32)
            .times(1)
            .returning(|_| Ok(()));

        let service = Service::new(Arc::new(tokens), Arc::new(MockUserRepository::new()));
        let token = service
            .issue(5, TimeDelta::days(3), TokenScope::Activation)
            .await
            .unwrap();

        assert_eq!(token.plaintext.len(), PLAINTEXT_LEN);
    }

    #[test]
    fn test_validate_plaintext() {
        let mut v = Validator::new();
        validate_plaintext(&mut v, "");
        assert_eq!(v.errors()["token"], "must be provided");

        let mut v = Validator::new();
        validate_plaintext(&mut v, "TOOSHORT");
        assert_eq!(v.errors()["token"], "must be 26 bytes long");

        let mut v = Validator::new();
        validate_plaintext(&mut v, &"A".repeat(27));
        assert!(!v.is_empty());

        let mut v = Validator::new();
        validate_plaintext(&mut v, &"A".repeat(26));
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_hashes_plaintext() {
        let plaintext = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut users = MockUserRepository::new();
        users
            .expect_get_for_token()
            .with(eq(TokenScope::Authentication), eq(hash_plaintext(plaintext)))
            .times(1)
            .returning(|_, _| Ok(user()));

        let service = Service::new(Arc::new(MockTokenRepository::new()), Arc::new(users));
        let found = service
            .lookup(TokenScope::Authentication, plaintext)
            .await
            .unwrap();

        assert_eq!(found.id, 5);
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_get_for_token()
            .returning(|_, _| Err(AppError::NotFound));

        let service = Service::new(Arc::new(MockTokenRepository::new()), Arc::new(users));
        let result = service
            .lookup(TokenScope::Activation, "ABCDEFGHIJKLMNOPQRSTUVWXYZ")
            .await;

        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_revoke_all() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_delete_all_for_user()
            .with(eq(TokenScope::Activation), eq(5))
            .times(1)
            .returning(|_, _| Ok(2));

        let service = Service::new(Arc::new(tokens), Arc::new(MockUserRepository::new()));
        assert_eq!(service.revoke_all(TokenScope::Activation, 5).await.unwrap(), 2);
    }
}
