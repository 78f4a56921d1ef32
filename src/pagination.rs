//! # Offset Pagination
//!
//! Skip/limit paging shared by list endpoints. Page numbers are derived as
//! `skip / limit + 1`, which is only an exact page index when `skip` is a
//! multiple of `limit`; clients rely on that formula, so it is kept as is.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 100;

/// A skip/limit window, always within `skip >= 0` and `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    skip: u64,
    limit: u64,
}

impl PageRequest {
    /// Clamps raw values into the allowed window.
    pub fn clamped(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0) as u64,
            limit: limit.clamp(1, MAX_LIMIT as i64) as u64,
        }
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn page_number(&self) -> u64 {
        self.skip / self.limit + 1
    }

    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Envelope returned by paged list endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matching rows before paging
    pub total: u64,
    /// 1-based page number, `skip / limit + 1`
    pub page: u64,
    /// Effective page size after clamping
    pub size: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page_number(),
            size: request.limit(),
            pages: request.page_count(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let request = PageRequest::clamped(0, 25);
        assert_eq!(request.page_count(105), 5);
        assert_eq!(request.page_count(100), 4);
        assert_eq!(request.page_count(0), 0);
        assert_eq!(request.page_count(1), 1);
    }

    #[test]
    fn page_number_uses_integer_division() {
        assert_eq!(PageRequest::clamped(50, 25).page_number(), 3);
        assert_eq!(PageRequest::clamped(0, 25).page_number(), 1);
        // Not a multiple of limit: still skip / limit + 1
        assert_eq!(PageRequest::clamped(30, 25).page_number(), 2);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let request = PageRequest::clamped(-10, 0);
        assert_eq!(request.skip(), 0);
        assert_eq!(request.limit(), 1);

        let request = PageRequest::clamped(5, 1_000);
        assert_eq!(request.limit(), MAX_LIMIT);
    }

    #[test]
    fn envelope_reports_effective_size() {
        let page = Page::new(vec!["a", "b"], 105, PageRequest::clamped(50, 25));
        assert_eq!(page.size, 25);
        assert_eq!(page.page, 3);
        assert_eq!(page.pages, 5);

        let mapped = page.map(str::len);
        assert_eq!(mapped.items, vec![1, 1]);
        assert_eq!(mapped.total, 105);
    }
}
