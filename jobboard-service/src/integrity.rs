//! Application-level referential integrity
//!
//! The store does not enforce foreign keys. Before a create, every
//! [`ForeignKey`] of the resource is resolved; before a delete, every
//! [`Dependent`] collection is counted. Both go through a
//! [`ReferenceResolver`], chosen once at startup:
//!
//! - [`StoreReferences`] answers from the document store
//! - [`UncheckedReferences`] reports every reference valid and nothing dependent
//!
//! Check and write are separate store calls. A referenced document deleted
//! between the two leaves a dangling reference; callers accept that window.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    ids::DocumentId,
    repository::{bounded, Dependent, ForeignKey, RepositoryOperation, RepositoryResult},
    store::{Document, DocumentStore, Filter},
};

/// Answers existence and dependency questions across collections
#[async_trait]
pub trait ReferenceResolver: Send + Sync {
    /// True when `collection` holds a document with identifier `id`
    async fn exists(&self, collection: &str, id: &DocumentId) -> RepositoryResult<bool>;

    /// Documents in `dependent.collection` whose `dependent.field` is `id`
    async fn count_referencing(
        &self,
        dependent: &Dependent,
        id: &DocumentId,
    ) -> RepositoryResult<u64>;
}

/// Resolver backed by the document store
#[derive(Clone)]
pub struct StoreReferences {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl StoreReferences {
    /// Resolve against `store`, bounding each call by `timeout`
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }
}

#[async_trait]
impl ReferenceResolver for StoreReferences {
    async fn exists(&self, collection: &str, id: &DocumentId) -> RepositoryResult<bool> {
        let found = bounded(
            self.timeout,
            RepositoryOperation::FindById,
            "reference",
            self.store.find_one(collection, id),
        )
        .await?;
        Ok(found.is_some())
    }

    async fn count_referencing(
        &self,
        dependent: &Dependent,
        id: &DocumentId,
    ) -> RepositoryResult<u64> {
        bounded(
            self.timeout,
            RepositoryOperation::Count,
            "reference",
            self.store.count(
                dependent.collection,
                &Filter::eq(dependent.field, id.to_string()),
            ),
        )
        .await
    }
}

/// Resolver that skips every check
#[derive(Debug, Clone, Copy, Default)]
pub struct UncheckedReferences;

#[async_trait]
impl ReferenceResolver for UncheckedReferences {
    async fn exists(&self, _collection: &str, _id: &DocumentId) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn count_referencing(
        &self,
        _dependent: &Dependent,
        _id: &DocumentId,
    ) -> RepositoryResult<u64> {
        Ok(0)
    }
}

/// Outcome of an integrity check that did not pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// A foreign key names a document that does not exist
    #[error("{entity} not found")]
    ReferenceNotFound {
        /// Field holding the dangling reference
        field: &'static str,
        /// Human-readable name of the missing entity
        entity: &'static str,
    },

    /// Delete refused while other documents reference the target
    #[error("{count} {dependent} document(s) still reference this {entity}")]
    Referenced {
        /// Entity being deleted
        entity: &'static str,
        /// Entity holding the references
        dependent: &'static str,
        /// How many references were found
        count: u64,
    },

    /// The check itself failed
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),
}

/// Verify every present foreign key in `document` resolves
///
/// Absent and null keys are skipped; required keys are enforced by
/// validation. Keys are checked in declaration order and the first
/// dangling one is reported.
pub async fn check_references(
    resolver: &dyn ReferenceResolver,
    references: &[ForeignKey],
    document: &Document,
) -> Result<(), IntegrityError> {
    for reference in references {
        let Some(raw) = document.get(reference.field).and_then(Value::as_str) else {
            continue;
        };
        let missing = IntegrityError::ReferenceNotFound {
            field: reference.field,
            entity: reference.entity,
        };
        let Ok(id) = DocumentId::parse(raw) else {
            return Err(missing);
        };
        if !resolver.exists(reference.collection, &id).await? {
            tracing::debug!(
                field = reference.field,
                collection = reference.collection,
                id = %id,
                "Reference does not resolve"
            );
            return Err(missing);
        }
    }
    Ok(())
}

/// Verify no dependent collection references `id`
pub async fn check_unreferenced(
    resolver: &dyn ReferenceResolver,
    entity: &'static str,
    dependents: &[Dependent],
    id: &DocumentId,
) -> Result<(), IntegrityError> {
    for dependent in dependents {
        let count = resolver.count_referencing(dependent, id).await?;
        if count > 0 {
            return Err(IntegrityError::Referenced {
                entity,
                dependent: dependent.entity,
                count,
            });
        }
    }
    Ok(())
}
