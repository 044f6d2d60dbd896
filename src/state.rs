//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::background::BackgroundTasks;
use crate::application::services::{
    AccountSettings, BookService, ReadingListService, ReviewService, TokenService, UserService,
};
use crate::domain::repositories::{
    BookRepository, ReadingListRepository, ReviewRepository, TokenRepository, UserRepository,
};
use crate::infrastructure::mailer::Mailer;
use crate::infrastructure::rate_limiter::{RateLimitSettings, RateLimiter};

/// Storage backends the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub books: Arc<dyn BookRepository>,
    pub lists: Arc<dyn ReadingListRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

/// Everything handlers and middleware need, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
    pub book_service: Arc<BookService>,
    pub reading_list_service: Arc<ReadingListService>,
    pub review_service: Arc<ReviewService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub background: Arc<BackgroundTasks>,
    /// Deployment environment reported by the healthcheck.
    pub environment: String,
    /// Take client IPs from forwarding headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        accounts: AccountSettings,
        limits: RateLimitSettings,
        environment: impl Into<String>,
        behind_proxy: bool,
    ) -> Self {
        let background = Arc::new(BackgroundTasks::new());
        let token_service = Arc::new(TokenService::new(repos.tokens, repos.users.clone()));

        Self {
            user_service: Arc::new(UserService::new(
                repos.users,
                token_service.clone(),
                mailer,
                background.clone(),
                accounts,
            )),
            token_service,
            book_service: Arc::new(BookService::new(repos.books.clone())),
            reading_list_service: Arc::new(ReadingListService::new(
                repos.lists,
                repos.books.clone(),
            )),
            review_service: Arc::new(ReviewService::new(repos.reviews, repos.books)),
            rate_limiter: Arc::new(RateLimiter::new(limits)),
            background,
            environment: environment.into(),
            behind_proxy,
        }
    }
}
