//! Generic resource repository
//!
//! Every entity is served by the same [`ResourceRepository`], instantiated
//! with the entity's static [`ResourceConfig`]. The pieces it composes are
//! public for reuse and testing:
//!
//! - **Pagination**: [`PageRequest`] normalises page/limit and computes page metadata
//! - **Sorting**: [`resolve_sort`] and [`OrderDirection::from_order_token`]
//! - **Filtering**: [`build_filter`] applies a per-entity [`FilterField`] policy
//!
//! # Example
//!
//! ```rust,ignore
//! use jobboard_service::models::Job;
//! use jobboard_service::repository::{ListParams, ResourceRepository};
//!
//! let jobs: ResourceRepository<Job> = ResourceRepository::new(store, timeout);
//! let (page, total) = jobs.list(&ListParams::from_query(query)).await?;
//! ```

mod error;
mod generic;
mod pagination;
mod query;
mod resource;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use generic::{bounded, timestamp_now, ResourceRepository, SYSTEM_ACTOR, UPDATED_FIELD};
pub use pagination::{
    resolve_sort, OrderDirection, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
pub use query::{build_filter, FilterField, ListParams, MatchKind};
pub use resource::{Dependent, ForeignKey, Resource, ResourceConfig, UpdatableField};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
