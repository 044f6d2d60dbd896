#![allow(dead_code)]

//! In-memory repositories and helpers for HTTP tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeDelta, Utc};

use bookclub::application::services::AccountSettings;
use bookclub::domain::entities::{
    Book, BookFields, BookSearch, ListFields, NewUser, ReadingList, Review, ReviewFields, Token,
    TokenScope, User,
};
use bookclub::domain::filters::{Filters, Metadata, Page};
use bookclub::domain::repositories::{
    BookRepository, ReadingListRepository, ReviewRepository, TokenRepository, UserRepository,
};
use bookclub::error::AppError;
use bookclub::infrastructure::mailer::{MailResult, MailTemplate, Mailer};
use bookclub::infrastructure::rate_limiter::RateLimitSettings;
use bookclub::routes::router;
use bookclub::state::{AppState, Repositories};
use bookclub::utils::password::hash_password;

pub const PASSWORD: &str = "pa55word";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<(Vec<u8>, i64, TokenScope, chrono::DateTime<Utc>)>,
    books: Vec<Book>,
    lists: Vec<ReadingList>,
    list_books: BTreeSet<(i64, i64)>,
    reviews: Vec<Review>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// One in-memory database implementing every repository trait.
///
/// Lists are returned in id order regardless of the requested sort.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> T {
        let mut tables = self.tables.lock().unwrap();
        f(&mut tables)
    }

    /// Marks the token as expired without deleting it.
    pub fn expire_tokens(&self) {
        self.with(|t| {
            for token in &mut t.tokens {
                token.3 = Utc::now() - TimeDelta::seconds(1);
            }
        });
    }
}

fn page_of<T: Clone>(items: Vec<T>, filters: &Filters) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(filters.offset() as usize)
        .take(filters.limit() as usize)
        .collect();
    Page::new(
        items,
        Metadata::calculate(total, filters.page, filters.page_size),
    )
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        self.with(|t| {
            if t.users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
            {
                return Err(AppError::field(
                    "email",
                    "a user with this email address already exists",
                ));
            }
            let user = User {
                id: t.next_id(),
                created_at: Utc::now(),
                username: new_user.username,
                email: new_user.email,
                password_hash: new_user.password_hash,
                activated: false,
                version: 1,
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }

    async fn get(&self, id: i64) -> Result<User, AppError> {
        self.with(|t| t.users.iter().find(|u| u.id == id).cloned())
            .ok_or(AppError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        self.with(|t| {
            t.users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned()
        })
        .ok_or(AppError::NotFound)
    }

    async fn update(&self, mut user: User) -> Result<User, AppError> {
        self.with(|t| {
            let stored = t
                .users
                .iter_mut()
                .find(|u| u.id == user.id && u.version == user.version)
                .ok_or(AppError::EditConflict)?;
            user.version += 1;
            *stored = user.clone();
            Ok(user)
        })
    }

    async fn get_for_token(
        &self,
        scope: TokenScope,
        token_hash: Vec<u8>,
    ) -> Result<User, AppError> {
        self.with(|t| {
            let now = Utc::now();
            let user_id = t
                .tokens
                .iter()
                .find(|(hash, _, s, expiry)| *hash == token_hash && *s == scope && *expiry > now)
                .map(|(_, user_id, _, _)| *user_id)?;
            t.users.iter().find(|u| u.id == user_id).cloned()
        })
        .ok_or(AppError::NotFound)
    }

    async fn count(&self) -> Result<(i64, i64), AppError> {
        Ok(self.with(|t| {
            let activated = t.users.iter().filter(|u| u.activated).count();
            (t.users.len() as i64, activated as i64)
        }))
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn insert(&self, token: &Token) -> Result<(), AppError> {
        self.with(|t| {
            t.tokens
                .push((token.hash.clone(), token.user_id, token.scope, token.expiry))
        });
        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        Ok(self.with(|t| {
            let before = t.tokens.len();
            t.tokens.retain(|(_, u, s, _)| !(*u == user_id && *s == scope));
            (before - t.tokens.len()) as u64
        }))
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        Ok(self.with(|t| {
            let now = Utc::now();
            let before = t.tokens.len();
            t.tokens.retain(|(_, _, _, expiry)| *expiry > now);
            (before - t.tokens.len()) as u64
        }))
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn insert(&self, fields: BookFields) -> Result<Book, AppError> {
        Ok(self.with(|t| {
            let book = Book {
                id: t.next_id(),
                fields,
                created_at: Utc::now(),
                version: 1,
            };
            t.books.push(book.clone());
            book
        }))
    }

    async fn get(&self, id: i64) -> Result<Book, AppError> {
        self.with(|t| t.books.iter().find(|b| b.id == id).cloned())
            .ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<Book>, AppError> {
        Ok(page_of(self.with(|t| t.books.clone()), &filters))
    }

    async fn search(&self, search: BookSearch, filters: Filters) -> Result<Page<Book>, AppError> {
        let matches = |value: &str, term: &str| {
            term.is_empty() || value.to_lowercase().contains(&term.to_lowercase())
        };
        let books: Vec<Book> = self.with(|t| {
            t.books
                .iter()
                .filter(|b| {
                    matches(&b.fields.title, &search.title)
                        && matches(&b.fields.author, &search.author)
                        && matches(&b.fields.genre, &search.genre)
                })
                .cloned()
                .collect()
        });
        Ok(page_of(books, &filters))
    }

    async fn update(&self, mut book: Book) -> Result<Book, AppError> {
        self.with(|t| {
            let stored = t
                .books
                .iter_mut()
                .find(|b| b.id == book.id && b.version == book.version)
                .ok_or(AppError::EditConflict)?;
            book.version += 1;
            *stored = book.clone();
            Ok(book)
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.with(|t| {
            let before = t.books.len();
            t.books.retain(|b| b.id != id);
            if t.books.len() == before {
                return Err(AppError::NotFound);
            }
            t.list_books.retain(|(_, book_id)| *book_id != id);
            t.reviews.retain(|r| r.book_id != id);
            Ok(())
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.with(|t| t.books.len() as i64))
    }
}

#[async_trait]
impl ReadingListRepository for MemoryStore {
    async fn insert(&self, user_id: i64, fields: ListFields) -> Result<ReadingList, AppError> {
        Ok(self.with(|t| {
            let list = ReadingList {
                id: t.next_id(),
                fields,
                user_id,
                created_at: Utc::now(),
                version: 1,
            };
            t.lists.push(list.clone());
            list
        }))
    }

    async fn get(&self, id: i64) -> Result<ReadingList, AppError> {
        self.with(|t| t.lists.iter().find(|l| l.id == id).cloned())
            .ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<ReadingList>, AppError> {
        Ok(page_of(self.with(|t| t.lists.clone()), &filters))
    }

    async fn get_for_user(
        &self,
        user_id: i64,
        filters: Filters,
    ) -> Result<Page<ReadingList>, AppError> {
        let lists: Vec<ReadingList> = self.with(|t| {
            t.lists
                .iter()
                .filter(|l| l.user_id == user_id)
                .cloned()
                .collect()
        });
        Ok(page_of(lists, &filters))
    }

    async fn update(&self, mut list: ReadingList) -> Result<ReadingList, AppError> {
        self.with(|t| {
            let stored = t
                .lists
                .iter_mut()
                .find(|l| l.id == list.id && l.version == list.version)
                .ok_or(AppError::EditConflict)?;
            list.version += 1;
            *stored = list.clone();
            Ok(list)
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.with(|t| {
            let before = t.lists.len();
            t.lists.retain(|l| l.id != id);
            if t.lists.len() == before {
                return Err(AppError::NotFound);
            }
            t.list_books.retain(|(list_id, _)| *list_id != id);
            Ok(())
        })
    }

    async fn add_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError> {
        self.with(|t| {
            if !t.books.iter().any(|b| b.id == book_id) {
                return Err(AppError::NotFound);
            }
            t.list_books.insert((list_id, book_id));
            Ok(())
        })
    }

    async fn get_books(&self, list_id: i64, filters: Filters) -> Result<Page<Book>, AppError> {
        let books: Vec<Book> = self.with(|t| {
            t.books
                .iter()
                .filter(|b| t.list_books.contains(&(list_id, b.id)))
                .cloned()
                .collect()
        });
        Ok(page_of(books, &filters))
    }

    async fn remove_book(&self, list_id: i64, book_id: i64) -> Result<(), AppError> {
        self.with(|t| {
            if t.list_books.remove(&(list_id, book_id)) {
                Ok(())
            } else {
                Err(AppError::NotFound)
            }
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.with(|t| t.lists.len() as i64))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert(
        &self,
        book_id: i64,
        user_id: i64,
        fields: ReviewFields,
    ) -> Result<Review, AppError> {
        self.with(|t| {
            if !t.books.iter().any(|b| b.id == book_id) {
                return Err(AppError::NotFound);
            }
            let review = Review {
                id: t.next_id(),
                book_id,
                user_id,
                fields,
                created_at: Utc::now(),
                version: 1,
            };
            t.reviews.push(review.clone());
            Ok(review)
        })
    }

    async fn get(&self, id: i64) -> Result<Review, AppError> {
        self.with(|t| t.reviews.iter().find(|r| r.id == id).cloned())
            .ok_or(AppError::NotFound)
    }

    async fn get_all(&self, filters: Filters) -> Result<Page<Review>, AppError> {
        Ok(page_of(self.with(|t| t.reviews.clone()), &filters))
    }

    async fn get_for_book(&self, book_id: i64, filters: Filters) -> Result<Page<Review>, AppError> {
        let reviews: Vec<Review> = self.with(|t| {
            t.reviews
                .iter()
                .filter(|r| r.book_id == book_id)
                .cloned()
                .collect()
        });
        Ok(page_of(reviews, &filters))
    }

    async fn get_for_user(&self, user_id: i64, filters: Filters) -> Result<Page<Review>, AppError> {
        let reviews: Vec<Review> = self.with(|t| {
            t.reviews
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        });
        Ok(page_of(reviews, &filters))
    }

    async fn update(&self, mut review: Review) -> Result<Review, AppError> {
        self.with(|t| {
            let stored = t
                .reviews
                .iter_mut()
                .find(|r| r.id == review.id && r.version == review.version)
                .ok_or(AppError::EditConflict)?;
            review.version += 1;
            *stored = review.clone();
            Ok(review)
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.with(|t| {
            let before = t.reviews.len();
            t.reviews.retain(|r| r.id != id);
            if t.reviews.len() == before {
                Err(AppError::NotFound)
            } else {
                Ok(())
            }
        })
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.with(|t| t.reviews.len() as i64))
    }
}

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, MailTemplate)>>,
}

impl RecordingMailer {
    /// Activation token of the most recent welcome email to `recipient`.
    pub fn activation_token(&self, recipient: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == recipient)
            .map(|(_, template)| match template {
                MailTemplate::UserWelcome {
                    activation_token, ..
                } => activation_token.clone(),
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, template: MailTemplate) -> MailResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), template));
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn disabled_limiter() -> RateLimitSettings {
    RateLimitSettings {
        enabled: false,
        ..RateLimitSettings::default()
    }
}

pub fn test_app() -> TestApp {
    test_app_with_limits(disabled_limiter())
}

pub fn test_app_with_limits(limits: RateLimitSettings) -> TestApp {
    let (state, store, mailer) = test_state(limits);
    let server = TestServer::new(router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        store,
        mailer,
    }
}

/// Application state over a fresh in-memory store, for tests that build
/// their own router.
pub fn test_state(
    limits: RateLimitSettings,
) -> (AppState, Arc<MemoryStore>, Arc<RecordingMailer>) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());

    let repos = Repositories {
        users: store.clone(),
        tokens: store.clone(),
        books: store.clone(),
        lists: store.clone(),
        reviews: store.clone(),
    };
    let accounts = AccountSettings {
        bcrypt_cost: 4,
        ..AccountSettings::default()
    };

    let state = AppState::new(repos, mailer.clone(), accounts, limits, "testing", false);
    (state, store, mailer)
}

impl TestApp {
    /// Inserts a user directly and returns it with a fresh authentication token.
    pub async fn seed_user(&self, email: &str, activated: bool) -> (User, String) {
        let password_hash = hash_password(PASSWORD.to_string(), 4).await.unwrap();
        let mut user = UserRepository::insert(
            self.store.as_ref(),
            NewUser {
                username: email.split('@').next().unwrap_or("reader").to_string(),
                email: email.to_string(),
                password_hash,
            },
        )
        .await
        .unwrap();

        if activated {
            user.activated = true;
            user = UserRepository::update(self.store.as_ref(), user).await.unwrap();
        }

        let token = self
            .state
            .token_service
            .issue(user.id, TimeDelta::hours(1), TokenScope::Authentication)
            .await
            .unwrap();

        (user, token.plaintext)
    }

    /// Waits until queued background work such as activation emails is done.
    pub async fn drain_background(&self) {
        assert!(self.state.background.wait(Duration::from_secs(5)).await);
    }
}

pub fn book_json(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "author": "Frank Herbert",
        "isbn": "9780441172719",
        "publication_date": "1965-08-01",
        "genre": "science fiction",
        "description": "Desert planet politics.",
        "average_rating": 4.3
    })
}
