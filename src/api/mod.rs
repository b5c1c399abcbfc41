//! The JSON route handlers of the REST API.

pub mod accounts;
pub mod budgets;
pub mod transactions;

use serde::Serialize;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    /// The one-based page number.
    pub page: u64,
    /// The page size.
    pub limit: u64,
    /// The total number of matching records, ignoring pagination.
    pub total: u64,
    /// The total number of pages.
    pub pages: u64,
}

impl Pagination {
    pub(crate) fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit.max(1)),
        }
    }
}
