//! Pagination types
//!
//! Page numbers come from the `?page=` query string and are resolved against
//! the row count: garbage means page 1, out-of-range means the last page.

use serde::{Deserialize, Serialize};

/// Posts per page in every listing
pub const PAGE_SIZE: u32 = 10;

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Pagination {
    /// Total number of pages for `total` rows. An empty listing still has one page.
    pub fn page_count(total: i64, per_page: u32) -> u32 {
        let per_page = i64::from(per_page.max(1));
        let pages = (total.max(0) + per_page - 1) / per_page;
        pages.max(1) as u32
    }

    /// Resolve a raw `?page=` value against the row count.
    ///
    /// - missing or not an integer → page 1
    /// - below 1 or past the end → last page
    pub fn resolve(requested: Option<&str>, total: i64, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let last = Self::page_count(total, per_page);

        let page = match requested.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n > i64::from(last) => last,
            Some(Ok(n)) => n as u32,
        };

        Self { page, per_page }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, window: Pagination) -> Self {
        let total_pages = Pagination::page_count(total, window.per_page);
        Self {
            items,
            total,
            page: window.page,
            per_page: window.per_page,
            total_pages,
            has_next: window.page < total_pages,
            has_prev: window.page > 1,
        }
    }

    /// Convert items, keeping the page window.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

/// Query parameters for pagination.
///
/// Kept as a string so a malformed value falls back to page 1 instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl PageParams {
    pub fn resolve(&self, total: i64) -> Pagination {
        Pagination::resolve(self.page.as_deref(), total, PAGE_SIZE)
    }
}
