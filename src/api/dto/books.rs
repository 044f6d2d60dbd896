//! DTOs for book endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::entities::BookFields;
use crate::domain::validation::Validator;
use crate::error::AppError;

/// Body of `POST /books`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_date: Option<NaiveDate>,
    pub genre: String,
    pub description: String,
    pub average_rating: f64,
}

impl CreateBookRequest {
    /// Builds validated book fields.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] with every failing field,
    /// including a missing `publication_date`.
    pub fn into_fields(self) -> Result<BookFields, AppError> {
        let mut v = Validator::new();
        v.check(
            self.publication_date.is_some(),
            "publication_date",
            "must be provided",
        );

        let fields = BookFields {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            publication_date: self.publication_date.unwrap_or_default(),
            genre: self.genre,
            description: self.description,
            average_rating: self.average_rating,
        };

        if let Err(AppError::FailedValidation(errors)) = fields.check() {
            for (field, message) in errors {
                v.add_error(field, message);
            }
        }

        v.finish()?;
        Ok(fields)
    }
}
