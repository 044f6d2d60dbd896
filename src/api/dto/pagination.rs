//! Pagination, sorting and search query parameters.

use serde::Deserialize;

use crate::domain::entities::BookSearch;
use crate::domain::filters::{Filters, RawFilters};
use crate::domain::validation::Validator;
use crate::error::AppError;

/// Query parameters accepted by list endpoints.
///
/// Values stay as strings until [`ListQuery::filters`] parses them, so a
/// non-numeric `page` becomes a field error instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,

    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl ListQuery {
    /// Validates pagination against an endpoint's sort safe list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::FailedValidation`] with `page`, `page_size` or
    /// `sort` entries.
    pub fn filters(
        &self,
        default_sort: &str,
        sort_safelist: &'static [&'static str],
    ) -> Result<Filters, AppError> {
        let mut v = Validator::new();
        let raw = RawFilters {
            page: self.page.as_deref(),
            page_size: self.page_size.as_deref(),
            sort: self.sort.as_deref(),
        };
        let filters = Filters::parse(&raw, default_sort, sort_safelist, &mut v);
        v.finish()?;
        Ok(filters)
    }

    /// Search terms; absent terms match everything.
    pub fn search(&self) -> BookSearch {
        BookSearch {
            title: self.title.clone().unwrap_or_default(),
            author: self.author.clone().unwrap_or_default(),
            genre: self.genre.clone().unwrap_or_default(),
        }
    }
}
