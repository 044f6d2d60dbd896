//! Data Transfer Objects for request and response bodies.
//!
//! Request bodies reject unknown keys. Fields a client may leave out are
//! optional here so that a missing value reaches validation and comes back as
//! a field error rather than a decoding error.

pub mod books;
pub mod health;
pub mod lists;
pub mod pagination;
pub mod reviews;
pub mod users;

pub use books::CreateBookRequest;
pub use health::{HealthResponse, SystemInfo};
pub use lists::{AddBookRequest, CreateListRequest};
pub use pagination::ListQuery;
pub use reviews::CreateReviewRequest;
pub use users::{ActivateUserRequest, AuthenticationRequest, RegisterUserRequest};
