//! Page/offset arithmetic for listings.

/// Default page size when the caller sends none (or a non-positive one).
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A sanitized page request. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request from raw caller input.
    ///
    /// Missing or non-positive `page` becomes 1; missing or non-positive
    /// `page_size` becomes [`DEFAULT_PAGE_SIZE`].
    #[must_use]
    pub fn coerce(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p > 0)
            .map_or(1, |p| u32::try_from(p).unwrap_or(u32::MAX));
        let page_size = page_size
            .filter(|s| *s > 0)
            .map_or(DEFAULT_PAGE_SIZE, |s| u32::try_from(s).unwrap_or(u32::MAX));
        Self { page, page_size }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Number of pages needed for `total_count` items (`ceil(total / size)`).
    #[must_use]
    pub const fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::coerce(None, None)
    }
}
