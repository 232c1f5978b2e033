//! Limit-based pagination for ledger listings.

use serde::{Deserialize, Serialize};

/// A row limit clamped to the range the ledger endpoints accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageLimit(u32);

impl PageLimit {
    /// Limit used when the caller does not ask for one.
    pub const DEFAULT: u32 = 50;
    /// Largest limit a caller may request.
    pub const MAX: u32 = 100;

    /// Creates a limit from an optional requested value, clamped to `1..=MAX`.
    #[must_use]
    pub fn new(requested: Option<u32>) -> Self {
        Self(requested.unwrap_or(Self::DEFAULT).clamp(1, Self::MAX))
    }

    /// Returns the limit value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        u64::from(self.0)
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Pagination metadata for limit-based listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Limit applied to the query.
    pub limit: u32,
    /// Number of items returned.
    pub count: usize,
    /// True when the page is full, so more rows may exist.
    pub has_more: bool,
}

impl PageMeta {
    /// Builds metadata for a page of `count` items fetched with `limit`.
    #[must_use]
    pub fn new(limit: PageLimit, count: usize) -> Self {
        Self {
            limit: limit.get(),
            count,
            has_more: usize::try_from(limit.get()).is_ok_and(|l| count == l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 50)]
    #[case(Some(10), 10)]
    #[case(Some(0), 1)]
    #[case(Some(500), 100)]
    fn test_limit_is_clamped(#[case] requested: Option<u32>, #[case] expected: u32) {
        assert_eq!(PageLimit::new(requested).get(), expected);
    }

    #[test]
    fn test_has_more_only_when_page_is_full() {
        let limit = PageLimit::new(Some(3));
        assert!(PageMeta::new(limit, 3).has_more);
        assert!(!PageMeta::new(limit, 2).has_more);
    }
}
