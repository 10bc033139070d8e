//! Validated pagination parameters.

/// Errors produced when validating raw paging input.
///
/// The messages are returned verbatim to API clients.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// Page number below 1.
    #[error("Page must be greater than or equal to 1")]
    PageTooSmall,
    /// Page size below 1.
    #[error("Page size must be greater than or equal to 1")]
    PageSizeTooSmall,
    /// Page size above the configured maximum.
    #[error("Page size must be less than or equal to {max}")]
    PageSizeTooLarge {
        /// Largest page size accepted.
        max: u32,
    },
}

/// A 1-based page number and page size that have passed validation.
///
/// Construct with [`PageRequest::new`]; the fields are private so a
/// `PageRequest` always describes a non-empty window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Page number used when the client omits one.
    pub const DEFAULT_PAGE: i64 = 1;
    /// Page size used when the client omits one.
    pub const DEFAULT_PAGE_SIZE: i64 = 10;

    /// Validate raw paging input.
    ///
    /// # Errors
    ///
    /// Returns `PageError` if `page` or `page_size` is below 1, or if
    /// `page_size` exceeds `max_page_size`. The page number is checked first.
    pub fn new(page: i64, page_size: i64, max_page_size: u32) -> Result<Self, PageError> {
        if page < 1 {
            return Err(PageError::PageTooSmall);
        }
        if page_size < 1 {
            return Err(PageError::PageSizeTooSmall);
        }
        let page_size = u32::try_from(page_size)
            .ok()
            .filter(|size| *size <= max_page_size)
            .ok_or(PageError::PageSizeTooLarge { max: max_page_size })?;
        let page = u32::try_from(page).unwrap_or(u32::MAX);

        Ok(Self { page, page_size })
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET` for this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    /// Number of pages needed to show `total_count` rows.
    #[must_use]
    pub fn total_pages(&self, total_count: i64) -> i64 {
        if total_count <= 0 {
            return 0;
        }
        let size = i64::from(self.page_size);
        (total_count + size - 1) / size
    }
}
