//! Reading list service.
//!
//! Lists are readable by every activated user but only their owner may
//! change them or their contents.

use std::sync::Arc;

use crate::domain::entities::{Book, ListFields, ListPatch, ReadingList, User};
use crate::domain::filters::{Filters, Page};
use crate::domain::repositories::{BookRepository, ReadingListRepository};
use crate::error::AppError;

pub struct ReadingListService<
    L: ReadingListRepository + ?Sized = dyn ReadingListRepository,
    B: BookRepository + ?Sized = dyn BookRepository,
> {
    lists: Arc<L>,
    books: Arc<B>,
}

impl<L: ReadingListRepository + ?Sized, B: BookRepository + ?Sized> ReadingListService<L, B> {
    pub fn new(lists: Arc<L>, books: Arc<B>) -> Self {
        Self { lists, books }
    }

    /// Creates a list owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] if any field is invalid.
    pub async fn create(&self, owner: &User, fields: ListFields) -> Result<ReadingList, AppError> {
        fields.check()?;
        self.lists.insert(owner.id, fields).await
    }

    pub async fn get(&self, id: i64) -> Result<ReadingList, AppError> {
        self.lists.get(id).await
    }

    pub async fn list(&self, filters: Filters) -> Result<Page<ReadingList>, AppError> {
        self.lists.get_all(filters).await
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<Page<ReadingList>, AppError> {
        self.lists.get_for_user(user_id, filters).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotPermitted`] unless `caller` owns the list,
    /// [`AppError::FailedValidation`] if the merged list is invalid and
    /// [`AppError::EditConflict`] on a concurrent change.
    pub async fn update(
        &self,
        caller: &User,
        id: i64,
        patch: ListPatch,
    ) -> Result<ReadingList, AppError> {
        let mut list = self.owned(caller, id).await?;
        patch.apply(&mut list.fields);
        list.fields.check()?;
        self.lists.update(list).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotPermitted`] unless `caller` owns the list.
    pub async fn delete(&self, caller: &User, id: i64) -> Result<(), AppError> {
        self.owned(caller, id).await?;
        self.lists.delete(id).await
    }

    /// Adds an existing book to the caller's list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] under `book_id` if the book does
    /// not exist and [`AppError::NotPermitted`] unless `caller` owns the list.
    pub async fn add_book(&self, caller: &User, list_id: i64, book_id: i64) -> Result<(), AppError> {
        let list = self.owned(caller, list_id).await?;

        match self.books.get(book_id).await {
            Ok(_) => {}
            Err(AppError::NotFound) => {
                return Err(AppError::field("book_id", "must reference an existing book"));
            }
            Err(e) => return Err(e),
        }

        self.lists.add_book(list.id, book_id).await
    }

    /// Books in a list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the list does not exist.
    pub async fn books(&self, list_id: i64, filters: Filters) -> Result<Page<Book>, AppError> {
        let list = self.lists.get(list_id).await?;
        self.lists.get_books(list.id, filters).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotPermitted`] unless `caller` owns the list and
    /// [`AppError::NotFound`] if the book is not in it.
    pub async fn remove_book(
        &self,
        caller: &User,
        list_id: i64,
        book_id: i64,
    ) -> Result<(), AppError> {
        let list = self.owned(caller, list_id).await?;
        self.lists.remove_book(list.id, book_id).await
    }

    async fn owned(&self, caller: &User, id: i64) -> Result<ReadingList, AppError> {
        let list = self.lists.get(id).await?;
        if !list.is_owned_by(caller.id) {
            return Err(AppError::NotPermitted);
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::reading_list::sample_fields;
    use crate::domain::repositories::{MockBookRepository, MockReadingListRepository};
    use chrono::Utc;
    use mockall::predicate::eq;

    type Service = ReadingListService<MockReadingListRepository, MockBookRepository>;

    fn caller(id: i64) -> User {
        User {
            id,
            created_at: Utc::now(),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            activated: true,
            version: 1,
        }
    }

    fn list(id: i64, owner: i64) -> ReadingList {
        ReadingList {
            id,
            fields: sample_fields(),
            user_id: owner,
            created_at: Utc::now(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_create_uses_caller_as_owner() {
        let mut lists = MockReadingListRepository::new();
        lists
            .expect_insert()
            .with(eq(7), eq(sample_fields()))
            .times(1)
            .returning(|owner, fields| {
                Ok(ReadingList {
                    id: 1,
                    fields,
                    user_id: owner,
                    created_at: Utc::now(),
                    version: 1,
                })
            });

        let service = Service::new(Arc::new(lists), Arc::new(MockBookRepository::new()));
        let created = service.create(&caller(7), sample_fields()).await.unwrap();
        assert_eq!(created.user_id, 7);
    }

    #[tokio::test]
    async fn test_update_by_other_user_is_not_permitted() {
        let mut lists = MockReadingListRepository::new();
        lists.expect_get().returning(|id| Ok(list(id, 7)));
        lists.expect_update().never();

        let service = Service::new(Arc::new(lists), Arc::new(MockBookRepository::new()));
        let result = service.update(&caller(8), 1, ListPatch::default()).await;
        assert!(matches!(result, Err(AppError::NotPermitted)));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let mut lists = MockReadingListRepository::new();
        lists.expect_get().returning(|id| Ok(list(id, 7)));
        lists
            .expect_update()
            .withf(|l| l.fields.status == "finished")
            .times(1)
            .returning(Ok);

        let service = Service::new(Arc::new(lists), Arc::new(MockBookRepository::new()));
        let updated = service
            .update(
                &caller(7),
                1,
                ListPatch {
                    status: Some("finished".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fields.status, "finished");
    }

    #[tokio::test]
    async fn test_delete_by_other_user_is_not_permitted() {
        let mut lists = MockReadingListRepository::new();
        lists.expect_get().returning(|id| Ok(list(id, 7)));
        lists.expect_delete().never();

        let service = Service::new(Arc::new(lists), Arc::new(MockBookRepository::new()));
        let result = service.delete(&caller(8), 1).await;
        assert!(matches!(result, Err(AppError::NotPermitted)));
    }

    #[tokio::test]
    async fn test_add_missing_book() {
        let mut lists = MockReadingListRepository::new();
        lists.expect_get().returning(|id| Ok(list(id, 7)));
        lists.expect_add_book().never();

        let mut books = MockBookRepository::new();
        books.expect_get().returning(|_| Err(AppError::NotFound));

        let service = Service::new(Arc::new(lists), Arc::new(books));
        match service.add_book(&caller(7), 1, 99).await {
            Err(AppError::FailedValidation(errors)) => {
                assert_eq!(errors["book_id"], "must reference an existing book")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remove_book_from_missing_list() {
        let mut lists = MockReadingListRepository::new();
        lists.expect_get().returning(|_| Err(AppError::NotFound));

        let service = Service::new(Arc::new(lists), Arc::new(MockBookRepository::new()));
        let result = service.remove_book(&caller(7), 1, 2).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
