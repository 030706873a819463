//! Pagination types shared by the listing queries.

use serde::{Deserialize, Serialize};

/// Hard upper bound on page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Raw pagination input as received from a caller. Values are clamped,
/// never rejected: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Clamp into the allowed range.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// SQL OFFSET for the clamped parameters. Widened to u64: `page` has
    /// no upper bound, so the multiplication must not run in u32.
    pub fn offset(self) -> u64 {
        let p = self.clamped();
        (p.page as u64 - 1) * p.limit as u64
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// One page of results plus the totals the listing contract requires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Assemble a page from clamped parameters and a total row count.
    pub fn new(items: Vec<T>, params: PageParams, total: u64) -> Self {
        let params = params.clamped();
        Self {
            items,
            page: params.page,
            limit: params.limit,
            total,
            total_pages: total.div_ceil(params.limit as u64),
        }
    }
}
