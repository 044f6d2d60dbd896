//! Book entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::validation::Validator;
use crate::error::AppError;

/// Sort keys accepted by book list endpoints.
pub const SORT_SAFELIST: &[&str] = &[
    "id",
    "title",
    "author",
    "genre",
    "average_rating",
    "publication_date",
    "-id",
    "-title",
    "-author",
    "-genre",
    "-average_rating",
    "-publication_date",
];

/// Client-editable book attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_date: NaiveDate,
    pub genre: String,
    pub description: String,
    #[validate(range(min = 1.0, max = 5.0, message = "must be between 1 and 5"))]
    pub average_rating: f64,
}

impl BookFields {
    /// Runs every book rule and returns the collected field errors.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] if any rule fails.
    pub fn check(&self) -> Result<(), AppError> {
        let mut v = Validator::new();

        v.check(!self.title.is_empty(), "title", "must be provided");
        v.check(self.title.len() <= 100, "title", "must not be more than 100 bytes long");
        v.check(!self.author.is_empty(), "author", "must be provided");
        v.check(self.author.len() <= 100, "author", "must not be more than 100 bytes long");
        v.check(!self.isbn.is_empty(), "isbn", "must be provided");
        v.check(self.isbn.len() <= 20, "isbn", "must not be more than 20 bytes long");
        v.check(!self.genre.is_empty(), "genre", "must be provided");
        v.check(!self.description.is_empty(), "description", "must be provided");
        v.check(
            self.description.len() <= 225,
            "description",
            "must not be more than 225 bytes long",
        );
        v.check(
            self.publication_date <= Utc::now().date_naive(),
            "publication_date",
            "must not be in the future",
        );

        if let Err(errors) = self.validate() {
            v.merge(&errors);
        }

        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub id: i64,
    #[serde(flatten)]
    pub fields: BookFields,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

/// Partial update for an existing book. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub average_rating: Option<f64>,
}

impl BookPatch {
    pub fn apply(self, fields: &mut BookFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(author) = self.author {
            fields.author = author;
        }
        if let Some(isbn) = self.isbn {
            fields.isbn = isbn;
        }
        if let Some(publication_date) = self.publication_date {
            fields.publication_date = publication_date;
        }
        if let Some(genre) = self.genre {
            fields.genre = genre;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(average_rating) = self.average_rating {
            fields.average_rating = average_rating;
        }
    }
}

/// Full-text search criteria. An empty field matches every book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearch {
    pub title: String,
    pub author: String,
    pub genre: String,
}

#[cfg(test)]
pub(crate) fn sample_fields() -> BookFields {
    BookFields {
        title: "The Left Hand of Darkness".to_string(),
        author: "Ursula K. Le Guin".to_string(),
        isbn: "9780441478125".to_string(),
        publication_date: NaiveDate::from_ymd_opt(1969, 3, 1).unwrap(),
        genre: "science fiction".to_string(),
        description: "An envoy visits a world whose people have no fixed sex.".to_string(),
        average_rating: 4.5,
    }
}
