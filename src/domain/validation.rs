//! Field-level validation accumulator.
//!
//! A [`Validator`] collects at most one message per field: the first failed
//! check for a field wins and later ones are ignored. It is meant to live for a
//! single validation pass and is converted into
//! [`AppError::FailedValidation`](crate::error::AppError::FailedValidation)
//! when non-empty.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, FieldErrors};

/// Pattern used for email address validation.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no error has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `field` unless the field already has an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Records `message` under `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Folds derive-based `validator` rules into this accumulator.
    ///
    /// The first error of each field is kept; fields that already carry an
    /// error are left untouched.
    pub fn merge(&mut self, errors: &validator::ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            if let Some(first) = field_errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                self.add_error(field.to_string(), message);
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// Converts the accumulated state into a result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] when any error was recorded.
    pub fn finish(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::FailedValidation(self.errors))
        }
    }
}

/// Returns true if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// Returns true if `value` matches `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}
