//! User entity and the request identity built from it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::validation::{EMAIL_RX, Validator, matches};

pub const USERNAME_MAX_BYTES: usize = 200;
pub const PASSWORD_MIN_BYTES: usize = 8;
pub const PASSWORD_MAX_BYTES: usize = 72;

/// A registered account.
///
/// The password hash and the optimistic-locking version never leave the
/// service in responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip)]
    pub version: i32,
}

/// Input data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Who is making the current request.
///
/// Authentication always yields an identity: requests without an
/// `Authorization` header are [`Identity::Anonymous`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        matches(email, &EMAIL_RX),
        "email",
        "must be a valid email address",
    );
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= PASSWORD_MIN_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    v.check(
        password.len() <= PASSWORD_MAX_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

pub fn validate_username(v: &mut Validator, username: &str) {
    v.check(!username.is_empty(), "username", "must be provided");
    v.check(
        username.len() <= USERNAME_MAX_BYTES,
        "username",
        "must not be more than 200 bytes long",
    );
}
