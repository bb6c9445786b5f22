//! # List Snapshots
//!
//! What a subscriber sees of one cache entry.

use crate::pagination::PaginationMeta;

/// The state of one `(resource, page, limit, search)` listing.
///
/// `data` holds the last successful page and survives later failures and refetches.
/// `error` is independent of `is_fetching`: a refetch that is still running after a
/// failure reports both.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub data: Option<Vec<T>>,
    pub pagination: Option<PaginationMeta>,
    pub is_fetching: bool,
    pub error: Option<String>,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            pagination: None,
            is_fetching: false,
            error: None,
        }
    }
}

impl<T> ListSnapshot<T> {
    /// True once a fetch has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !self.is_fetching && (self.data.is_some() || self.error.is_some())
    }

    pub fn rows(&self) -> &[T] {
        self.data.as_deref().unwrap_or_default()
    }
}

/// Counters exposed for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub in_flight: usize,
    /// One-shot callers parked on an in-flight fetch.
    pub waiting: usize,
    pub subscribers: usize,
    /// Number of list requests sent to the transport since the actor started.
    pub fetches: u64,
}
