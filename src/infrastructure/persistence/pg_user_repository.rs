//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;

use super::{DEFAULT_QUERY_TIMEOUT, timed};
use crate::domain::entities::{NewUser, TokenScope, User};
use crate::domain::repositories::UserRepository;
use crate::error::{AppError, is_unique_violation};

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
const DUPLICATE_EMAIL_MESSAGE: &str = "a user with this email address already exists";

const USER_COLUMNS: &str = "users.id, users.created_at, users.username, users.email::text AS email, \
     users.password_hash, users.activated, users.version";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    created_at: DateTime<Utc>,
    username: String,
    email: String,
    password_hash: String,
    activated: bool,
    version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            activated: row.activated,
            version: row.version,
        }
    }
}

/// PostgreSQL repository for user accounts.
///
/// Emails are stored as `citext`, so lookups and the uniqueness constraint
/// ignore case.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn fetch_one(&self, sql: &str, bind: i64) -> Result<User, AppError> {
        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, UserRow>(sql)
                .bind(bind)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;
        Ok(row.into())
    }
}

fn map_duplicate_email(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e, EMAIL_UNIQUE_CONSTRAINT) {
        AppError::field("email", DUPLICATE_EMAIL_MESSAGE)
    } else {
        e.into()
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, activated)
             VALUES ($1, $2, $3, FALSE)
             RETURNING {USER_COLUMNS}"
        );

        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_as::<_, UserRow>(&sql)
                .bind(&new_user.username)
                .bind(&new_user.email)
                .bind(&new_user.password_hash)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        result.map(User::from).map_err(map_duplicate_email)
    }

    async fn get(&self, id: i64) -> Result<User, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        self.fetch_one(&sql, id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1::citext");
        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, UserRow>(&sql)
                .bind(email)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;
        Ok(row.into())
    }

    async fn update(&self, mut user: User) -> Result<User, AppError> {
        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE users
                SET username = $1, email = $2, password_hash = $3, activated = $4,
                    version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.activated)
            .bind(user.id)
            .bind(user.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?;

        match result.map_err(map_duplicate_email)? {
            Some(version) => {
                user.version = version;
                Ok(user)
            }
            None => Err(AppError::EditConflict),
        }
    }

    async fn get_for_token(
        &self,
        scope: TokenScope,
        token_hash: Vec<u8>,
    ) -> Result<User, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}
             FROM users
             INNER JOIN tokens ON tokens.user_id = users.id
             WHERE tokens.hash = $1 AND tokens.scope = $2 AND tokens.expiry > $3"
        );

        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, UserRow>(&sql)
                .bind(token_hash)
                .bind(scope.as_str())
                .bind(Utc::now())
                .fetch_one(self.pool.as_ref()),
        )
        .await?;
        Ok(row.into())
    }

    async fn count(&self) -> Result<(i64, i64), AppError> {
        timed(
            self.query_timeout,
            sqlx::query_as::<_, (i64, i64)>(
                "SELECT count(*), count(*) FILTER (WHERE activated) FROM users",
            )
            .fetch_one(self.pool.as_ref()),
        )
        .await
    }
}
