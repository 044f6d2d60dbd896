//! Book catalogue service.

use std::sync::Arc;

use crate::domain::entities::{Book, BookFields, BookPatch, BookSearch};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::BookRepository;
use crate::error::AppError;

/// Service for creating, browsing and editing books.
pub struct BookService<R: BookRepository + ?Sized = dyn BookRepository> {
    repository: Arc<R>,
}

impl<R: BookRepository + ?Sized> BookService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Validates and stores a new book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] if any field is invalid.
    pub async fn create(&self, fields: BookFields) -> Result<Book, AppError> {
        fields.check()?;
        self.repository.insert(fields).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    pub async fn get(&self, id: i64) -> Result<Book, AppError> {
        self.repository.get(id).await
    }

    pub async fn list(&self, filters: Filters) -> Result<Page<Book>, AppError> {
        self.repository.get_all(filters).await
    }

    pub async fn search(&self, search: BookSearch, filters: Filters) -> Result<Page<Book>, AppError> {
        self.repository.search(search, filters).await
    }

    /// Applies `patch` to the stored book, validates the result and saves it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist,
    /// [`AppError::FailedValidation`] if the merged book is invalid and
    /// [`AppError::EditConflict`] if it was changed concurrently.
    pub async fn update(&self, id: i64, patch: BookPatch) -> Result<Book, AppError> {
        let mut book = self.repository.get(id).await?;
        patch.apply(&mut book.fields);
        book.fields.check()?;
        self.repository.update(book).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the book does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::book::sample_fields;
    use crate::domain::filters::Metadata;
    use crate::domain::repositories::MockBookRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn book(id: i64) -> Book {
        Book {
            id,
            fields: sample_fields(),
            created_at: Utc::now(),
            version: 1,
        }
    }

    fn filters() -> Filters {
        Filters {
            page: 1,
            page_size: 10,
            sort: "id".to_string(),
            sort_safelist: crate::domain::entities::book::SORT_SAFELIST,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let mut repo = MockBookRepository::new();
        repo.expect_insert()
            .with(eq(sample_fields()))
            .times(1)
            .returning(|fields| {
                Ok(Book {
                    id: 1,
                    fields,
                    created_at: Utc::now(),
                    version: 1,
                })
            });

        let service = BookService::new(Arc::new(repo));
        let created = service.create(sample_fields()).await.unwrap();
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_create_invalid_never_reaches_repository() {
        let service = BookService::new(Arc::new(MockBookRepository::new()));
        let fields = BookFields {
            average_rating: 7.0,
            ..sample_fields()
        };

        let result = service.create(fields).await;
        assert!(matches!(result, Err(AppError::FailedValidation(_))));
    }

    #[tokio::test]
    async fn test_update_merges_then_validates() {
        let mut repo = MockBookRepository::new();
        repo.expect_get().with(eq(4)).returning(|id| Ok(book(id)));
        repo.expect_update()
            .withf(|b| b.fields.title == "New title" && b.fields.author == sample_fields().author)
            .times(1)
            .returning(|mut b| {
                b.version += 1;
                Ok(b)
            });

        let service = BookService::new(Arc::new(repo));
        let updated = service
            .update(
                4,
                BookPatch {
                    title: Some("New title".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn test_update_invalid_merge() {
        let mut repo = MockBookRepository::new();
        repo.expect_get().returning(|id| Ok(book(id)));
        repo.expect_update().never();

        let service = BookService::new(Arc::new(repo));
        let result = service
            .update(
                4,
                BookPatch {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::FailedValidation(errors)) => {
                assert_eq!(errors["title"], "must be provided")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_conflict() {
        let mut repo = MockBookRepository::new();
        repo.expect_get().returning(|id| Ok(book(id)));
        repo.expect_update().returning(|_| Err(AppError::EditConflict));

        let service = BookService::new(Arc::new(repo));
        let result = service.update(4, BookPatch::default()).await;
        assert!(matches!(result, Err(AppError::EditConflict)));
    }

    #[tokio::test]
    async fn test_search_passes_criteria() {
        let mut repo = MockBookRepository::new();
        repo.expect_search()
            .withf(|s, f| s.author == "Le Guin" && s.title.is_empty() && f.page == 1)
            .times(1)
            .returning(|_, _| Ok(Page::new(vec![book(1)], Metadata::calculate(1, 1, 10))));

        let service = BookService::new(Arc::new(repo));
        let page = service
            .search(
                BookSearch {
                    author: "Le Guin".to_string(),
                    ..Default::default()
                },
                filters(),
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.metadata.total_records, 1);
    }
}
