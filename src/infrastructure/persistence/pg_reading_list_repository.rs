//! PostgreSQL implementation of reading list repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;

use super::pg_book_repository::{BOOK_COLUMNS, BookRow};
use super::{Counted, DEFAULT_QUERY_TIMEOUT, paginate, timed};
use crate::domain::entities::{Book, ListFields, ReadingList};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::ReadingListRepository;
use crate::error::{AppError, is_foreign_key_violation};

const LIST_COLUMNS: &str = "id, created_at, name, description, user_id, status, version";

#[derive(FromRow)]
struct ListRow {
    #[sqlx(default)]
    total_records: i64,
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    description: String,
    user_id: i64,
    status: String,
    version: i32,
}

impl Counted for ListRow {
    fn total_records(&self) -> i64 {
        self.total_records
    }
}

impl From<ListRow> for ReadingList {
    fn from(row: ListRow) -> Self {
        ReadingList {
            id: row.id,
            fields: ListFields {
                name: row.name,
                description: row.description,
                status: row.status,
            },
            user_id: row.user_id,
            created_at: row.created_at,
            version: row.version,
        }
    }
}

/// PostgreSQL repository for reading lists and the `reading_list_books`
/// membership table.
pub struct PgReadingListRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgReadingListRepository {
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
impl ReadingListRepository for PgReadingListRepository {
    async fn insert(&self, user_id: i64, fields: ListFields) -> Result<ReadingList, AppError> {
        let sql = format!(
            "INSERT INTO reading_lists (name, description, user_id, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {LIST_COLUMNS}"
        );

        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, ListRow>(&sql)
                .bind(&fields.name)
                .bind(&fields.description)
                .bind(user_id)
                .bind(&fields.status)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i64) -> Result<ReadingList, AppError> {
        let sql = format!("SELECT {LIST_COLUMNS} FROM reading_lists WHERE id = $1");
        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, ListRow>(&sql)
                .bind(id)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<ReadingList>, AppError> {
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {LIST_COLUMNS}
             FROM reading_lists
             {}
             LIMIT $1 OFFSET $2",
            filters.order_by()
        );

        let rows = timed(
            self.query_timeout,
            sqlx::query_as::<_, ListRow>(&sql)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, &filters))
    }

    async fn get_for_user(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<Page<ReadingList>, AppError> {
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {LIST_COLUMNS}
             FROM reading_lists
             WHERE user_id = $1
             {}
             LIMIT $2 OFFSET $3",
            filters.order_by()
        );

        let rows = timed(
            self.query_timeout,
            sqlx::query_as::<_, ListRow>(&sql)
                .bind(user_id)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, &filters))
    }

    async fn update(&self, mut list: ReadingList) -> Result<ReadingList, AppError> {
        let version = timed(
            self.query_timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE reading_lists
                SET name = $1, description = $2, status = $3, version = version + 1
                WHERE id = $4 AND version = $5
                RETURNING version
                "#,
            )
            .bind(&list.fields.name)
            .bind(&list.fields.description)
            .bind(&list.fields.status)
            .bind(list.id)
            .bind(list.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(AppError::EditConflict)?;

        list.version = version;
        Ok(list)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM reading_lists WHERE id = $1")
                .bind(id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn add_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError> {
        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO reading_list_books (list_id, book_id)
                VALUES ($1, $2)
                ON CONFLICT (list_id, book_id) DO NOTHING
                "#,
            )
            .bind(list_id)
            .bind(book_id)
            .execute(self.pool.as_ref()),
        )
        .await?;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_books(&self, list_id: i64, filters: Filters) -> Result<Page<Book>, AppError> {
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {BOOK_COLUMNS}
             FROM books
             WHERE id IN (SELECT book_id FROM reading_list_books WHERE list_id = $1)
             {}
             LIMIT $2 OFFSET $3",
            filters.order_by()
        );

        let rows = timed(
            self.query_timeout,
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(list_id)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, &filters))
    }

    async fn remove_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM reading_list_books WHERE list_id = $1 AND book_id = $2")
                .bind(list_id)
                .bind(book_id)
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
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM reading_lists")
                .fetch_one(self.pool.as_ref()),
        )
        .await
    }
}
