//! PostgreSQL implementation of book repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use std::time::Duration;

use super::{Counted, DEFAULT_QUERY_TIMEOUT, paginate, timed};
use crate::domain::entities::{Book, BookFields, BookSearch};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::BookRepository;
use crate::error::AppError;

pub(crate) const BOOK_COLUMNS: &str = "id, created_at, title, author, isbn, publication_date, \
     genre, description, average_rating, version";

#[derive(FromRow)]
pub(crate) struct BookRow {
    #[sqlx(default)]
    total_records: i64,
    id: i64,
    created_at: DateTime<Utc>,
    title: String,
    author: String,
    isbn: String,
    publication_date: NaiveDate,
    genre: String,
    description: String,
    average_rating: f64,
    version: i32,
}

impl Counted for BookRow {
    fn total_records(&self) -> i64 {
        self.total_records
    }
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            fields: BookFields {
                title: row.title,
                author: row.author,
                isbn: row.isbn,
                publication_date: row.publication_date,
                genre: row.genre,
                description: row.description,
                average_rating: row.average_rating,
            },
            created_at: row.created_at,
            version: row.version,
        }
    }
}

/// PostgreSQL repository for the book catalogue.
///
/// Search uses `simple` text-search configuration over GIN indexes on title,
/// author and genre.
pub struct PgBookRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgBookRepository {
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
impl BookRepository for PgBookRepository {
    async fn insert(&self, fields: BookFields) -> Result<Book, AppError> {
        let sql = format!(
            "INSERT INTO books (title, author, isbn, publication_date, genre, description, average_rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {BOOK_COLUMNS}"
        );

        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(&fields.title)
                .bind(&fields.author)
                .bind(&fields.isbn)
                .bind(fields.publication_date)
                .bind(&fields.genre)
                .bind(&fields.description)
                .bind(fields.average_rating)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: i64) -> Result<Book, AppError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = timed(
            self.query_timeout,
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(id)
                .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.into())
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<Book>, AppError> {
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {BOOK_COLUMNS}
             FROM books
             {}
             LIMIT $1 OFFSET $2",
            filters.order_by()
        );

        let rows = timed(
            self.query_timeout,
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, &filters))
    }

    async fn search(&self, search: BookSearch, filters: Filters) -> Result<Page<Book>, AppError> {
        let sql = format!(
            "SELECT count(*) OVER() AS total_records, {BOOK_COLUMNS}
             FROM books
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
               AND (to_tsvector('simple', author) @@ plainto_tsquery('simple', $2) OR $2 = '')
               AND (to_tsvector('simple', genre) @@ plainto_tsquery('simple', $3) OR $3 = '')
             {}
             LIMIT $4 OFFSET $5",
            filters.order_by()
        );

        let rows = timed(
            self.query_timeout,
            sqlx::query_as::<_, BookRow>(&sql)
                .bind(&search.title)
                .bind(&search.author)
                .bind(&search.genre)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(paginate(rows, &filters))
    }

    async fn update(&self, mut book: Book) -> Result<Book, AppError> {
        let fields = &book.fields;
        let version = timed(
            self.query_timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE books
                SET title = $1, author = $2, isbn = $3, publication_date = $4, genre = $5,
                    description = $6, average_rating = $7, version = version + 1
                WHERE id = $8 AND version = $9
                RETURNING version
                "#,
            )
            .bind(&fields.title)
            .bind(&fields.author)
            .bind(&fields.isbn)
            .bind(fields.publication_date)
            .bind(&fields.genre)
            .bind(&fields.description)
            .bind(fields.average_rating)
            .bind(book.id)
            .bind(book.version)
            .fetch_optional(self.pool.as_ref()),
        )
        .await?
        .ok_or(AppError::EditConflict)?;

        book.version = version;
        Ok(book)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            self.query_timeout,
            sqlx::query("DELETE FROM books WHERE id = $1")
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
            sqlx::query_scalar::<_, i64>("SELECT count(*) FROM books").fetch_one(self.pool.as_ref()),
        )
        .await
    }
}
