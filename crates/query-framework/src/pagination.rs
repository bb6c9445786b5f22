//! # Pagination
//!
//! Page arithmetic shared by the data table and the list endpoints.
//!
//! The table counts pages from zero (`page_index`), the REST API counts them from one
//! (`page`). The only place the two meet is [`to_api_page`] / [`to_page_index`].

use serde::{Deserialize, Serialize};

/// Number of pages needed to show `total_count` rows, never less than one.
///
/// A `page_size` of zero is treated as one.
pub fn total_pages(total_count: u64, page_size: usize) -> usize {
    let size = u64::try_from(page_size.max(1)).unwrap_or(u64::MAX);
    let pages = total_count.div_ceil(size);
    usize::try_from(pages).unwrap_or(usize::MAX).max(1)
}

/// Converts a zero-based table index into the one-based `page` query parameter.
pub fn to_api_page(page_index: usize) -> u32 {
    u32::try_from(page_index)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Converts a one-based `page` parameter back into a zero-based table index.
pub fn to_page_index(api_page: u32) -> usize {
    usize::try_from(api_page.saturating_sub(1)).unwrap_or(usize::MAX)
}

/// Server-driven pagination as the table sees it.
///
/// `page_index` is kept inside `[0, total_pages - 1]` by every constructor and
/// builder method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page_index: usize,
    page_size: usize,
    total_count: u64,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize, total_count: u64) -> Self {
        let mut state = Self {
            page_index: 0,
            page_size: page_size.max(1),
            total_count,
        };
        state.page_index = state.clamp_index(page_index);
        state
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count, self.page_size)
    }

    /// Clamps a navigation request into the valid page range.
    pub fn clamp_index(&self, requested: usize) -> usize {
        requested.min(self.total_pages() - 1)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.total_pages()
    }

    pub fn with_page_index(self, page_index: usize) -> Self {
        Self::new(page_index, self.page_size, self.total_count)
    }

    /// Changes the page size, keeping the index in range.
    pub fn with_page_size(self, page_size: usize) -> Self {
        Self::new(self.page_index, page_size, self.total_count)
    }

    pub fn with_total_count(self, total_count: u64) -> Self {
        Self::new(self.page_index, self.page_size, total_count)
    }
}

/// The `pagination` object of a listing response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default, rename = "totalPage")]
    pub total_page: u32,
}

impl PaginationMeta {
    pub fn to_state(&self) -> PaginationState {
        PaginationState::new(
            to_page_index(self.page),
            usize::try_from(self.limit).unwrap_or(usize::MAX),
            self.total,
        )
    }
}
