//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::{DEFAULT_QUERY_TIMEOUT, timed};
use crate::domain::entities::{Token, TokenScope};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// PostgreSQL repository for token hashes. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgTokenRepository {
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
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn insert(&self, token: &Token) -> Result<(), AppError> {
        timed(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                .bind(scope.as_str())
                .bind(user_id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM tokens WHERE expiry <= NOW()").execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
