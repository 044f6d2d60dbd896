//! Reading list entity.
//!
//! A reading list belongs to the user who created it and holds an unordered
//! set of books through the `reading_list_books` join table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::validation::{Validator, permitted_value};
use crate::error::AppError;

pub const SORT_SAFELIST: &[&str] = &["id", "name", "status", "-id", "-name", "-status"];

pub const STATUS_READING: &str = "reading";
pub const STATUS_FINISHED: &str = "finished";

const STATUSES: &[&str] = &[STATUS_READING, STATUS_FINISHED];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFields {
    pub name: String,
    pub description: String,
    pub status: String,
}

impl ListFields {
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] if any rule fails.
    pub fn check(&self) -> Result<(), AppError> {
        let mut v = Validator::new();

        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(self.name.len() <= 100, "name", "must not be more than 100 bytes long");
        v.check(!self.description.is_empty(), "description", "must be provided");
        v.check(
            self.description.len() <= 225,
            "description",
            "must not be more than 225 bytes long",
        );
        v.check(!self.status.is_empty(), "status", "must be provided");
        v.check(
            permitted_value(&self.status.as_str(), STATUSES),
            "status",
            "must be either reading or finished",
        );

        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingList {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ListFields,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

impl ReadingList {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl ListPatch {
    pub fn apply(self, fields: &mut ListFields) {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_fields() -> ListFields {
    ListFields {
        name: "Summer".to_string(),
        description: "Beach reads".to_string(),
        status: STATUS_READING.to_string(),
    }
}
