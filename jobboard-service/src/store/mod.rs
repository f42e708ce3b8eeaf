//! Document store boundary
//!
//! Everything above this module talks to persistence through the
//! [`DocumentStore`] trait: schema-free JSON documents grouped into named
//! collections, addressed by [`DocumentId`].
//!
//! Backends are selected by the store URL scheme:
//! - `mem://` - [`MemoryStore`], in-process (tests, local development)
//! - `ws://` / `wss://` / `http://` / `https://` - SurrealDB (`surrealdb` feature)

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    config::StoreConfig,
    error::{DatabaseError, Result},
    ids::DocumentId,
    repository::OrderDirection,
};

pub mod memory;
#[cfg(feature = "surrealdb")]
pub mod surreal;

pub use memory::MemoryStore;
#[cfg(feature = "surrealdb")]
pub use surreal::SurrealStore;

/// A stored document
pub type Document = serde_json::Map<String, Value>;

/// Result type for store calls
pub type StoreResult<T> = std::result::Result<T, DatabaseError>;

/// Field holding the document identifier in every document a store returns
pub const ID_FIELD: &str = "id";

/// Store-neutral filter expression
///
/// `And(vec![])` matches every document; `Or(vec![])` matches none.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every clause must match
    And(Vec<Filter>),
    /// At least one clause must match
    Or(Vec<Filter>),
    /// Case-insensitive substring match on a string field
    Contains {
        /// Field name
        field: String,
        /// Substring to look for
        needle: String,
    },
    /// Exact equality
    Eq {
        /// Field name
        field: String,
        /// Value the field must equal
        value: Value,
    },
}

impl Filter {
    /// Filter matching every document
    #[must_use]
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// Exact match on one field
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive substring match on one field
    #[must_use]
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// True for the empty conjunction
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::And(clauses) if clauses.is_empty())
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

/// Ordering applied to a find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to order by
    pub field: String,
    /// Direction
    pub direction: OrderDirection,
}

/// Paging and ordering for [`DocumentStore::find_many`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Documents to skip
    pub skip: u64,
    /// Maximum documents to return, `None` for all
    pub limit: Option<u64>,
    /// Ordering, `None` for store order
    pub sort: Option<SortSpec>,
}

/// CRUD primitives over named collections
///
/// Implementations are shared by every request handler and must be safe to
/// call concurrently. Dropping a returned future abandons the call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and readiness output
    fn backend(&self) -> &'static str;

    /// Documents matching `filter`, paged and ordered by `options`
    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Number of documents matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// The document with the given id
    async fn find_one(&self, collection: &str, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Store a new document and return its generated id
    ///
    /// Any `id` field in `document` is replaced.
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId>;

    /// Merge `fields` into the document; returns the number of documents matched
    async fn update_fields(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Document,
    ) -> StoreResult<u64>;

    /// Remove the document; returns the number of documents removed
    async fn delete_one(&self, collection: &str, id: &DocumentId) -> StoreResult<u64>;

    /// Round trip to the backend
    async fn ping(&self) -> StoreResult<()>;

    /// Release connections. Called once during shutdown.
    async fn close(&self) {}
}

/// Open the store named by `config.url`
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    if config.url.starts_with("mem://") {
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    #[cfg(feature = "surrealdb")]
    {
        let store = SurrealStore::connect(config).await?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "surrealdb"))]
    {
        Err(crate::error::Error::InvalidConfig(format!(
            "store url '{}' needs the `surrealdb` feature",
            crate::error::sanitize_url(&config.url)
        )))
    }
}
