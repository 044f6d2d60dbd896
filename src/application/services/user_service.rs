//! User registration, activation and login.

use std::sync::Arc;

use chrono::TimeDelta;
use tracing::{error, info};

use super::token_service::{TokenService, validate_plaintext};
use crate::application::background::BackgroundTasks;
use crate::domain::entities::user::{validate_email, validate_password_plaintext, validate_username};
use crate::domain::entities::{NewUser, Token, TokenScope, User};
use crate::domain::repositories::UserRepository;
use crate::domain::validation::Validator;
use crate::error::AppError;
use crate::infrastructure::mailer::{MailTemplate, Mailer};
use crate::utils::password::{hash_password, verify_password};

/// Tunables for account handling.
#[derive(Debug, Clone, Copy)]
pub struct AccountSettings {
    pub bcrypt_cost: u32,
    pub activation_ttl: TimeDelta,
    pub authentication_ttl: TimeDelta,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            activation_ttl: TimeDelta::days(3),
            authentication_ttl: TimeDelta::hours(24),
        }
    }
}

/// Service for user accounts.
///
/// Registration sends the activation token by email on a background task, so
/// the response never waits on SMTP.
pub struct UserService<U: UserRepository + ?Sized = dyn UserRepository> {
    users: Arc<U>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    background: Arc<BackgroundTasks>,
    settings: AccountSettings,
}

impl<U: UserRepository + ?Sized> UserService<U> {
    pub fn new(
        users: Arc<U>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        background: Arc<BackgroundTasks>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            background,
            settings,
        }
    }

    /// Creates an inactive account and emails an activation token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] for invalid input or an email
    /// that is already registered.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, AppError> {
        let mut v = Validator::new();
        validate_username(&mut v, &username);
        validate_email(&mut v, &email);
        validate_password_plaintext(&mut v, &password);
        v.finish()?;

        let password_hash = hash_password(password, self.settings.bcrypt_cost).await?;

        let user = self
            .users
            .insert(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        let token = self
            .tokens
            .issue(user.id, self.settings.activation_ttl, TokenScope::Activation)
            .await?;

        info!(user_id = user.id, "user registered");

        let mailer = self.mailer.clone();
        let recipient = user.email.clone();
        let template = MailTemplate::UserWelcome {
            activation_token: token.plaintext,
            user_id: user.id,
        };
        self.background.spawn(async move {
            if let Err(e) = mailer.send(&recipient, template).await {
                error!(error = %e, "failed to send activation email");
            }
        });

        Ok(user)
    }

    /// Activates the account owning `plaintext` and revokes its activation
    /// tokens.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] under `token` for a malformed,
    /// unknown or expired token, and [`AppError::EditConflict`] if the user
    /// changed concurrently.
    pub async fn activate(&self, plaintext: &str) -> Result<User, AppError> {
        let mut v = Validator::new();
        validate_plaintext(&mut v, plaintext);
        v.finish()?;

        let mut user = match self.tokens.lookup(TokenScope::Activation, plaintext).await {
            Ok(user) => user,
            Err(AppError::NotFound) => {
                return Err(AppError::field(
                    "token",
                    "invalid or expired activation token",
                ));
            }
            Err(e) => return Err(e),
        };

        user.activated = true;
        let user = self.users.update(user).await?;

        self.tokens
            .revoke_all(TokenScope::Activation, user.id)
            .await?;

        info!(user_id = user.id, "user activated");
        Ok(user)
    }

    /// Exchanges credentials for an authentication token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] for malformed input and
    /// [`AppError::InvalidCredentials`] for an unknown email or wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, AppError> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        validate_password_plaintext(&mut v, password);
        v.finish()?;

        let user = match self.users.get_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound) => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.tokens
            .issue(
                user.id,
                self.settings.authentication_ttl,
                TokenScope::Authentication,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user does not exist.
    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users.get(id).await
    }
}
