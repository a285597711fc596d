//! Shared page/limit pagination helpers.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("`{field}` must be a positive integer")]
    NotPositive { field: &'static str },
}

/// A 1-based pagination window. Both components are at least 1 by
/// construction; the offset derivation can therefore never underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::NotPositive { field: "page" });
        }
        if limit == 0 {
            return Err(PaginationError::NotPositive { field: "limit" });
        }
        Ok(Self { page, limit })
    }

    /// Resolve optional query parameters against a per-resource default
    /// limit. An absent page always means the first page.
    pub fn from_query(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, PaginationError> {
        Self::new(page.unwrap_or(1), limit.unwrap_or(default_limit))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_zero_based_windows() {
        let first = PageRequest::new(1, 3).expect("valid window");
        let second = PageRequest::new(2, 3).expect("valid window");
        assert_eq!(first.offset(), 0);
        assert_eq!(second.offset(), 3);
    }

    #[test]
    fn zero_components_are_rejected() {
        assert_eq!(
            PageRequest::new(0, 10),
            Err(PaginationError::NotPositive { field: "page" })
        );
        assert_eq!(
            PageRequest::new(1, 0),
            Err(PaginationError::NotPositive { field: "limit" })
        );
    }

    #[test]
    fn query_defaults_fill_absent_parameters() {
        let page = PageRequest::from_query(None, None, 10).expect("defaults are valid");
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);
    }
}
