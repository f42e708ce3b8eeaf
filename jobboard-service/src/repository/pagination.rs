//! Paging and ordering for listing queries
//!
//! Page numbers and limits arrive from query strings and are normalised
//! rather than rejected: a page below 1 becomes 1, a limit outside
//! `1..=MAX_LIMIT` becomes `DEFAULT_LIMIT`.
//!
//! # Example
//!
//! ```rust
//! use jobboard_service::repository::{resolve_sort, OrderDirection, PageRequest};
//!
//! let page = PageRequest::new(Some(3), Some(20));
//! assert_eq!(page.skip(), 40);
//! assert_eq!(page.total_pages(41), 3);
//! assert!(!page.has_more(60));
//!
//! assert_eq!(resolve_sort("salary", &["title", "created_time"], "created_time"), "created_time");
//! assert_eq!(OrderDirection::from_order_token("asc"), OrderDirection::Ascending);
//! assert_eq!(OrderDirection::from_order_token("ASC"), OrderDirection::Descending);
//! ```

use std::fmt;

/// Page used when none (or an invalid one) is requested
pub const DEFAULT_PAGE: u64 = 1;

/// Limit used when none (or an invalid one) is requested
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest accepted limit
pub const MAX_LIMIT: u64 = 100;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    #[default]
    Descending,
}

impl OrderDirection {
    /// Map a query-string order token
    ///
    /// Only the exact token `asc` sorts ascending; anything else, including
    /// an empty token, sorts descending.
    #[must_use]
    pub fn from_order_token(token: &str) -> Self {
        if token == "asc" {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A normalised page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number
    pub page: u64,
    /// Items per page, within `1..=MAX_LIMIT`
    pub limit: u64,
}

impl PageRequest {
    /// Normalise untrusted page and limit values
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if (1..=MAX_LIMIT as i64).contains(&l) => l as u64,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Documents to skip before this page
    #[must_use]
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` items
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }

    /// True when items exist beyond this page
    #[must_use]
    pub fn has_more(&self, total: u64) -> bool {
        self.page.saturating_mul(self.limit) < total
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pick the sort field
///
/// Returns `default` unless `requested` appears verbatim in `sortable`.
#[must_use]
pub fn resolve_sort(
    requested: &str,
    sortable: &[&'static str],
    default: &'static str,
) -> &'static str {
    sortable
        .iter()
        .copied()
        .find(|field| *field == requested)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let page = PageRequest::new(None, None);
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_invalid_values_normalise() {
        assert_eq!(PageRequest::new(Some(0), Some(5)).page, 1);
        assert_eq!(PageRequest::new(Some(-7), Some(5)).page, 1);
        assert_eq!(PageRequest::new(Some(2), Some(0)).limit, 10);
        assert_eq!(PageRequest::new(Some(2), Some(-1)).limit, 10);
        assert_eq!(PageRequest::new(Some(2), Some(101)).limit, 10);
        assert_eq!(PageRequest::new(Some(2), Some(100)).limit, 100);
        assert_eq!(PageRequest::new(Some(2), Some(1)).limit, 1);
    }

    #[test]
    fn test_skip() {
        assert_eq!(PageRequest::new(Some(1), Some(25)).skip(), 0);
        assert_eq!(PageRequest::new(Some(4), Some(25)).skip(), 75);
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(100)).skip(), u64::MAX);
    }

    #[test]
    fn test_total_pages_and_has_more_hold_for_small_ranges() {
        for total in 0..=250u64 {
            for limit in 1..=12u64 {
                for page in 1..=30u64 {
                    let request = PageRequest::new(Some(page as i64), Some(limit as i64));
                    let expected_pages = (total + limit - 1) / limit;
                    assert_eq!(request.total_pages(total), expected_pages);
                    assert_eq!(request.has_more(total), page * limit < total);
                }
            }
        }
    }

    #[test]
    fn test_empty_collection() {
        let request = PageRequest::default();
        assert_eq!(request.total_pages(0), 0);
        assert!(!request.has_more(0));
    }

    #[test]
    fn test_resolve_sort_whitelist() {
        let sortable = ["title", "location", "created_time"];
        assert_eq!(resolve_sort("title", &sortable, "created_time"), "title");
        assert_eq!(resolve_sort("", &sortable, "created_time"), "created_time");
        assert_eq!(resolve_sort("password", &sortable, "created_time"), "created_time");
        assert_eq!(resolve_sort("Title", &sortable, "created_time"), "created_time");
    }

    #[test]
    fn test_order_token() {
        assert_eq!(OrderDirection::from_order_token("asc"), OrderDirection::Ascending);
        assert_eq!(OrderDirection::from_order_token("desc"), OrderDirection::Descending);
        assert_eq!(OrderDirection::from_order_token(""), OrderDirection::Descending);
        assert_eq!(OrderDirection::from_order_token("up"), OrderDirection::Descending);
        assert_eq!(OrderDirection::default(), OrderDirection::Descending);
        assert_eq!(OrderDirection::Ascending.to_string(), "asc");
    }
}
