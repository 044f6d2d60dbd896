//! DTOs for review endpoints.

use serde::Deserialize;

use crate::domain::entities::ReviewFields;

/// Body of `POST /books/{id}/reviews`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub content: String,
}

impl From<CreateReviewRequest> for ReviewFields {
    fn from(req: CreateReviewRequest) -> Self {
        Self {
            rating: req.rating,
            content: req.content,
        }
    }
}
