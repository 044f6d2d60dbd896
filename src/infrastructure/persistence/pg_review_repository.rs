//! PostgreSQL implementation of review repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;

use super::{Counted, DEFAULT_QUERY_TIMEOUT, paginate, timed};
use crate::domain::entities::{Review, ReviewFields};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::ReviewRepository;
use crate::error::{AppError, is_foreign_key_violation};

const REVIEW_COLUMNS: &str = "id, created_at, book_id, user_id, rating, content, version";

#[derive(FromRow)]
struct ReviewRow {
    #[sqlx(default)]
    total_records: i64,
    id: i64,
    created_at: DateTime<Utc>,
    book_id: i64,
    user_id: i64,
    rating: i32,
    content: String,
    version: i32,
}

impl Counted for ReviewRow {
    fn total_records(&self) -> i64 {
        self.total_records
    }
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            book_id: row.book_id,
            user_id: row.user_id,
            fields: ReviewFields {
                rating: row.rating,
                content: row.content,
            },
            created_at: row.created_at,
            version: row.version,
        }
    }
}

pub struct PgReviewRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgReviewRepository {
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

    /// Runs a paged select, optionally restricted to `column = owner`.
    async fn page_where(
        &self,
        filter: Option<(&'static str, i64)>,
        filters: &Filters,
    ) -> Result<Page<Review>, AppError> {
        let (condition, limit_at) = match filter {
            Some((column, _)) => (format!("WHERE {column} = $1"), 2),
            None => (String::new(), 1),
        };
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {REVIEW_COLUMNS}
             FROM reviews
             {condition}
             {}
             LIMIT ${} OFFSET ${}",
            filters.order_by(),
            limit_at,
            limit_at + 1
        );

        let mut query = sqlx::query_as::<_, ReviewRow>(&sql);
        if let Some((_, owner)) = filter {
            query = query.bind(owner);
        }

        let rows = timed(
            self.query_timeout,
            query
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, filters))
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn insert(
        &self,
        book_id: i64,
        user_id: i64,
        fields: ReviewFields,
    ) -> Result<Review, AppError> {
        let sql = format!(
            "INSERT INTO reviews (book_id, user_id, rating, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {REVIEW_COLUMNS}"
        );

        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query_as::<_, ReviewRow>(&sql)
                .bind(book_id)
                .bind(user_id)
                .bind(fields.rating)
                .bind(&fields.content)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        match result {
            Ok(row) => Ok(row.into()),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: i64) -> Result<Review, AppError> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, ReviewRow>(&sql)
                .bind(id)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<Review>, AppError> {
        self.page_where(None, &filters).await
    }

    async fn get_for_book(&self, book_id: i64, filters: Filters) -> Result<Page<Review>, AppError> {
        self.page_where(Some(("book_id", book_id)), &filters).await
    }

    async fn get_for_user(&self, user_id: i64, filters: Filters) -> Result<Page<Review>, AppError> {
        self.page_where(Some(("user_id", user_id)), &filters).await
    }

    async fn update(&self, mut review: Review) -> Result<Review, AppError> {
        let version = timed(
            self.query_timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE reviews
                SET rating = $1, content = $2, version = version + 1
                WHERE id = $3 AND version = $4
                RETURNING version
                "#,
            )
            .bind(review.fields.rating)
            .bind(&review.fields.content)
            .bind(review.id)
            .bind(review.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(AppError::EditConflict)?;

        review.version = version;
        Ok(review)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM reviews WHERE id = $1")
                .bind(id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        timed(
            self.query_timeout,
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM reviews")
                .fetch_one(self.pool.as_ref()),
        )
        .await
    }
}
