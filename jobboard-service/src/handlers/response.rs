//! Response types for resource handlers
//!
//! Listings are wrapped in a pagination envelope; single entities are
//! returned bare.
//!
//! # Example
//!
//! ```rust
//! use jobboard_service::handlers::{ListResponse, PaginationMeta};
//! use jobboard_service::repository::PageRequest;
//!
//! let pagination = PaginationMeta::new(PageRequest::new(Some(2), Some(20)), 50);
//! assert_eq!(pagination.total_pages, 3);
//! assert!(pagination.has_more);
//!
//! let response = ListResponse::new(vec!["a", "b"], pagination);
//! assert_eq!(response.data.len(), 2);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::repository::PageRequest;

/// Pagination metadata for list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u64,
    /// Number of items per page
    pub limit: u64,
    /// Items matching the filters across all pages
    pub total: u64,
    /// Total number of pages
    pub total_pages: u64,
    /// Whether items exist beyond this page
    pub has_more: bool,
}

impl PaginationMeta {
    /// Metadata for `page` once the filtered `total` is known
    #[must_use]
    pub fn new(page: PageRequest, total: u64) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total,
            total_pages: page.total_pages(total),
            has_more: page.has_more(total),
        }
    }
}

/// List response with pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// The items on this page
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> ListResponse<T> {
    /// Create a new list response
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self { data, pagination }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A freshly created entity, answered with `201 Created`
#[derive(Debug, Clone)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_meta_empty_collection() {
        let meta = PaginationMeta::new(PageRequest::default(), 0);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_pagination_meta_last_page() {
        let meta = PaginationMeta::new(PageRequest::new(Some(3), Some(10)), 25);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_list_response_serialization() {
        let response = ListResponse::new(
            vec![1, 2],
            PaginationMeta::new(PageRequest::new(Some(1), Some(2)), 5),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["pagination"]["total"], 5);
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["has_more"], true);
    }

    #[test]
    fn test_created_status() {
        let response = Created("x").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
