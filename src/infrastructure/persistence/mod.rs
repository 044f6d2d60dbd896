//! PostgreSQL repository implementations.
//!
//! Queries are checked at runtime rather than with `query!`, because list
//! queries splice a safe-listed `ORDER BY` clause into the SQL text. Every
//! query runs under a timeout; an elapsed timeout surfaces as
//! [`AppError::Internal`].
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - User accounts
//! - [`PgTokenRepository`] - Hashed bearer tokens
//! - [`PgBookRepository`] - Book catalogue and full-text search
//! - [`PgReadingListRepository`] - Reading lists and membership
//! - [`PgReviewRepository`] - Book reviews

use std::future::Future;
use std::time::Duration;

use crate::domain::filters::{Filters, Metadata, Page};
use crate::error::AppError;

pub mod pg_book_repository;
pub mod pg_reading_list_repository;
pub mod pg_review_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_book_repository::PgBookRepository;
pub use pg_reading_list_repository::PgReadingListRepository;
pub use pg_review_repository::PgReviewRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;

/// Default upper bound for a single database round trip.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs a query future under `limit`.
pub(crate) async fn timed<T, F>(limit: Duration, query: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    Ok(tokio::time::timeout(limit, query).await??)
}

/// Rows of a list query that carry the `count(*) OVER()` window total.
pub(crate) trait Counted {
    fn total_records(&self) -> i64;
}

/// Converts windowed rows into a page. An empty result has zero metadata.
pub(crate) fn paginate<R, T>(rows: Vec<R>, filters: &Filters) -> Page<T>
where
    R: Counted + Into<T>,
{
    let total = rows.first().map_or(0, Counted::total_records);
    let metadata = Metadata::calculate(total, filters.page, filters.page_size);
    Page::new(rows.into_iter().map(Into::into).collect(), metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(i64, i64);

    impl Counted for Row {
        fn total_records(&self) -> i64 {
            self.1
        }
    }

    impl From<Row> for i64 {
        fn from(row: Row) -> i64 {
            row.0
        }
    }

    fn filters(page: i64) -> Filters {
        Filters {
            page,
            page_size: 2,
            sort: "id".to_string(),
            sort_safelist: &["id"],
        }
    }

    #[test]
    fn test_paginate() {
        let page: Page<i64> = paginate(vec![Row(3, 5), Row(4, 5)], &filters(2));
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.metadata.total_records, 5);
        assert_eq!(page.metadata.last_page, 3);
        assert_eq!(page.metadata.current_page, 2);
    }

    #[test]
    fn test_paginate_empty() {
        let page: Page<i64> = paginate(Vec::<Row>::new(), &filters(9));
        assert!(page.items.is_empty());
        assert_eq!(page.metadata, Metadata::default());
    }

    #[tokio::test]
    async fn test_timed_elapsed_is_internal() {
        let result: Result<(), AppError> = timed(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_timed_maps_row_not_found() {
        let result: Result<(), AppError> =
            timed(DEFAULT_QUERY_TIMEOUT, async { Err(sqlx::Error::RowNotFound) }).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
