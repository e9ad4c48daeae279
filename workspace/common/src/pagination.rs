use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Rows per page used by the activity screens.
pub const DEFAULT_PER_PAGE: u64 = 20;
/// Upper bound for any client supplied page size.
pub const MAX_PER_PAGE: u64 = 100;

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Builds a request from raw query values. Page 0 is treated as page 1 and
    /// the page size is clamped to `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<u64>, per_page: Option<u64>, default_per_page: u64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Zero-based page index as expected by the ORM paginator.
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, DEFAULT_PER_PAGE)
    }
}

/// One page of results plus the numbers a client needs to render pagination links.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Page<T> {
    /// Rows on this page
    pub data: Vec<T>,
    /// Current page (1-based)
    pub current_page: u64,
    /// Requested page size
    pub per_page: u64,
    /// Total number of matching rows
    pub total: u64,
    /// Last available page, never below 1
    pub last_page: u64,
    /// Search term applied to the query, echoed back for pagination links
    pub search: Option<String>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: u64, search: Option<String>) -> Self {
        Self {
            data,
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page: total.div_ceil(request.per_page).max(1),
            search,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            search: self.search,
        }
    }
}
