//! Pagination and sorting contract shared by every list endpoint.
//!
//! Raw `page`, `page_size` and `sort` query values are parsed and validated
//! into [`Filters`]. Only sort keys from the endpoint's safe list are accepted,
//! so the column name interpolated into `ORDER BY` never originates from the
//! client.

use serde::Serialize;

use crate::domain::validation::Validator;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw pagination values as they arrive in the query string.
#[derive(Debug, Clone, Default)]
pub struct RawFilters<'a> {
    pub page: Option<&'a str>,
    pub page_size: Option<&'a str>,
    pub sort: Option<&'a str>,
}

/// Validated pagination and sort settings for one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Parses and validates raw query values.
    ///
    /// Parse and range failures are recorded in `v` under `page`,
    /// `page_size` and `sort`; the returned value is only meaningful when `v`
    /// is still empty afterwards.
    pub fn parse(
        raw: &RawFilters<'_>,
        default_sort: &str,
        sort_safelist: &'static [&'static str],
        v: &mut Validator,
    ) -> Self {
        let filters = Self {
            page: read_int(raw.page, DEFAULT_PAGE, "page", v),
            page_size: read_int(raw.page_size, DEFAULT_PAGE_SIZE, "page_size", v),
            sort: raw
                .sort
                .filter(|s| !s.is_empty())
                .unwrap_or(default_sort)
                .to_string(),
            sort_safelist,
        };
        filters.validate(v);
        filters
    }

    /// Records range and safe-list violations in `v`.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            self.sort_safelist.contains(&self.sort.as_str()),
            "sort",
            "invalid sort value",
        );
    }

    /// Column to order by, taken from the safe list rather than from input.
    pub fn sort_column(&self) -> &'static str {
        self.sort_safelist
            .iter()
            .find(|safe| **safe == self.sort)
            .map(|safe| safe.trim_start_matches('-'))
            .unwrap_or("id")
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    /// `ORDER BY` clause with `id` as the stable tie-breaker.
    pub fn order_by(&self) -> String {
        format!(
            "ORDER BY {} {}, id ASC",
            self.sort_column(),
            self.sort_direction()
        )
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// `(page - 1) * page_size`, saturating for pages past any real table.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn read_int(raw: Option<&str>, default: i64, field: &str, v: &mut Validator) -> i64 {
    match raw.filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => match s.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(field, "must be an integer value");
                default
            }
        },
    }
}

/// Pagination summary returned alongside every list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// Derives metadata from a total row count. Zero records yield the zero value.
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

/// One page of results plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, metadata: Metadata) -> Self {
        Self { items, metadata }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFELIST: &[&str] = &["id", "title", "-id", "-title"];

    fn parse(page: Option<&str>, page_size: Option<&str>, sort: Option<&str>) -> (Filters, Validator) {
        let mut v = Validator::new();
        let raw = RawFilters {
            page,
            page_size,
            sort,
        };
        let filters = Filters::parse(&raw, "id", SAFELIST, &mut v);
        (filters, v)
    }

    #[test]
    fn test_defaults() {
        let (f, v) = parse(None, None, None);
        assert!(v.is_empty());
        assert_eq!(f.page, 1);
        assert_eq!(f.page_size, 10);
        assert_eq!(f.sort, "id");
        assert_eq!(f.offset(), 0);
        assert_eq!(f.limit(), 10);
    }

    #[test]
    fn test_offset_and_limit() {
        for page in [1_i64, 2, 7, 10_000_000] {
            for page_size in [1_i64, 10, 55, 100] {
                let (f, v) = parse(
                    Some(&page.to_string()),
                    Some(&page_size.to_string()),
                    None,
                );
                assert!(v.is_empty());
                assert_eq!(f.offset(), (page - 1) * page_size);
                assert_eq!(f.limit(), page_size);
            }
        }
    }

    #[test]
    fn test_page_size_above_maximum_is_error() {
        let (_, v) = parse(None, Some("101"), None);
        assert_eq!(v.errors()["page_size"], "must be a maximum of 100");
    }

    #[test]
    fn test_zero_values_are_errors() {
        let (_, v) = parse(Some("0"), Some("0"), None);
        assert_eq!(v.errors()["page"], "must be greater than zero");
        assert_eq!(v.errors()["page_size"], "must be greater than zero");
    }

    #[test]
    fn test_page_has_no_upper_bound() {
        let (f, v) = parse(Some(&i64::MAX.to_string()), Some("100"), None);
        assert!(v.is_empty());
        assert_eq!(f.offset(), i64::MAX);
    }

    #[test]
    fn test_non_integer_values() {
        let (_, v) = parse(Some("abc"), Some("1.5"), None);
        assert_eq!(v.errors()["page"], "must be an integer value");
        assert_eq!(v.errors()["page_size"], "must be an integer value");
    }

    #[test]
    fn test_sort_outside_safelist_is_error() {
        for sort in ["password_hash", "id; DROP TABLE books", "--id", "TITLE"] {
            let (_, v) = parse(None, None, Some(sort));
            assert_eq!(v.errors()["sort"], "invalid sort value", "sort = {sort}");
        }
    }

    #[test]
    fn test_sort_column_and_direction() {
        let (f, _) = parse(None, None, Some("-title"));
        assert_eq!(f.sort_column(), "title");
        assert_eq!(f.sort_direction(), "DESC");
        assert_eq!(f.order_by(), "ORDER BY title DESC, id ASC");

        let (f, _) = parse(None, None, Some("title"));
        assert_eq!(f.sort_column(), "title");
        assert_eq!(f.sort_direction(), "ASC");
    }

    #[test]
    fn test_unvalidated_sort_never_reaches_sql() {
        let f = Filters {
            page: 1,
            page_size: 10,
            sort: "name; --".to_string(),
            sort_safelist: SAFELIST,
        };
        assert_eq!(f.sort_column(), "id");
    }

    #[test]
    fn test_metadata_zero_records() {
        assert_eq!(Metadata::calculate(0, 3, 20), Metadata::default());
    }

    #[test]
    fn test_metadata_last_page() {
        let m = Metadata::calculate(101, 2, 10);
        assert_eq!(m.current_page, 2);
        assert_eq!(m.page_size, 10);
        assert_eq!(m.first_page, 1);
        assert_eq!(m.last_page, 11);
        assert_eq!(m.total_records, 101);

        assert_eq!(Metadata::calculate(100, 1, 10).last_page, 10);
        assert_eq!(Metadata::calculate(1, 1, 100).last_page, 1);
    }
}
