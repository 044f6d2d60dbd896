//! Book review entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::validation::Validator;
use crate::error::AppError;

pub const SORT_SAFELIST: &[&str] = &["id", "rating", "created_at", "-id", "-rating", "-created_at"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReviewFields {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i32,
    pub content: String,
}

impl ReviewFields {
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] if any rule fails.
    pub fn check(&self) -> Result<(), AppError> {
        let mut v = Validator::new();

        v.check(!self.content.is_empty(), "content", "must be provided");
        v.check(
            self.content.len() <= 225,
            "content",
            "must not be more than 225 bytes long",
        );

        if let Err(errors) = self.validate() {
            v.merge(&errors);
        }

        v.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub fields: ReviewFields,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

impl Review {
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewPatch {
    pub rating: Option<i32>,
    pub content: Option<String>,
}

impl ReviewPatch {
    pub fn apply(self, fields: &mut ReviewFields) {
        if let Some(rating) = self.rating {
            fields.rating = rating;
        }
        if let Some(content) = self.content {
            fields.content = content;
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_fields() -> ReviewFields {
    ReviewFields {
        rating: 4,
        content: "Slow start, great ending.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_review() {
        assert!(sample_fields().check().is_ok());
    }

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 6, -1] {
            let fields = ReviewFields {
                rating,
                ..sample_fields()
            };
            match fields.check() {
                Err(AppError::FailedValidation(errors)) => {
                    assert_eq!(errors["rating"], "must be between 1 and 5")
                }
                other => panic!("unexpected result for {rating}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_content_rules() {
        let fields = ReviewFields {
            content: "c".repeat(226),
            ..sample_fields()
        };
        match fields.check() {
            Err(AppError::FailedValidation(errors)) => {
                assert_eq!(errors["content"], "must not be more than 225 bytes long")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_patch_merges_before_validation() {
        let mut fields = sample_fields();
        ReviewPatch {
            rating: Some(9),
            content: None,
        }
        .apply(&mut fields);
        assert_eq!(fields.content, sample_fields().content);
        assert!(fields.check().is_err());
    }
}
