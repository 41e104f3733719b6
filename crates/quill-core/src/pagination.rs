//! Pagination contract shared by every listing operation.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Smallest and largest accepted page sizes.
pub const MIN_PAGE_SIZE: u64 = 1;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A validated pagination request. Pages are 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Validate and build a request. Page 0 is `InvalidPage`; a size outside
    /// 1..=100 is `InvalidPageSize`.
    pub fn new(page: u64, page_size: u64) -> Result<Self, ContentError> {
        if page == 0 {
            return Err(ContentError::InvalidPage(page));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ContentError::InvalidPageSize(page_size));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of items to skip before this page starts. Saturates: a page
    /// far past the end must yield an empty slice, not overflow.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of items in a full page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// A bounded window of results plus total-count metadata.
///
/// `total` counts everything matching the filter, independent of slicing.
/// An out-of-range page carries an empty `items` slice, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total.div_ceil(request.page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_page_zero() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(ContentError::InvalidPage(0))
        ));
    }

    #[test]
    fn rejects_out_of_range_sizes() {
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(ContentError::InvalidPageSize(0))
        ));
        assert!(matches!(
            PageRequest::new(1, 101),
            Err(ContentError::InvalidPageSize(101))
        ));
        assert!(PageRequest::new(1, 100).is_ok());
    }

    #[test]
    fn skip_is_zero_based_offset() {
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.skip(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn skip_saturates_on_huge_page_numbers() {
        let req = PageRequest::new(u64::MAX, 100).unwrap();
        assert_eq!(req.skip(), u64::MAX);
    }

    #[test]
    fn total_pages_is_ceiling() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(Page::<u8>::new(vec![], 0, &req).total_pages, 0);
        assert_eq!(Page::<u8>::new(vec![], 1, &req).total_pages, 1);
        assert_eq!(Page::<u8>::new(vec![], 10, &req).total_pages, 1);
        assert_eq!(Page::<u8>::new(vec![], 11, &req).total_pages, 2);
        assert_eq!(Page::<u8>::new(vec![], 95, &req).total_pages, 10);
    }

    #[test]
    fn out_of_range_page_keeps_totals() {
        let req = PageRequest::new(9, 10).unwrap();
        let page = Page::<u8>::new(vec![], 13, &req);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages, 2);
    }
}
