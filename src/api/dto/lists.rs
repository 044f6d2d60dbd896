//! DTOs for reading list endpoints.

use serde::Deserialize;

use crate::domain::entities::ListFields;

/// Body of `POST /lists`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateListRequest {
    pub name: String,
    pub description: String,
    pub status: String,
}

impl From<CreateListRequest> for ListFields {
    fn from(req: CreateListRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            status: req.status,
        }
    }
}

/// Body of `POST /lists/{id}/books`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddBookRequest {
    pub book_id: i64,
}
