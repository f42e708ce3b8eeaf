//! Per-entity resource description
//!
//! A [`Resource`] is an entity type plus a static [`ResourceConfig`] naming
//! its collection, listing policy and relationships. The generic
//! repository, integrity checks and handlers read everything they need
//! from the config, so adding an entity is a matter of data.

use serde::{de::DeserializeOwned, Serialize};

use super::query::FilterField;
use crate::validation::FieldErrors;

/// A foreign key checked before create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Field holding the referenced identifier
    pub field: &'static str,
    /// Collection the identifier must resolve in
    pub collection: &'static str,
    /// Human-readable name of the referenced entity
    pub entity: &'static str,
}

/// Another collection whose documents point at this resource
///
/// Deleting a resource fails while any dependent document references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependent {
    /// Collection holding the referencing documents
    pub collection: &'static str,
    /// Field in that collection holding our identifier
    pub field: &'static str,
    /// Human-readable name of the referencing entity
    pub entity: &'static str,
}

/// The single field a narrow update may change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatableField {
    /// Field name in both request body and document
    pub field: &'static str,
    /// Accepted values
    pub allowed: &'static [&'static str],
}

/// Static description of one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Collection name, also the URL segment
    pub collection: &'static str,
    /// Type name used in error context
    pub type_name: &'static str,
    /// Human-readable name used in messages
    pub entity: &'static str,
    /// Accepted listing filters
    pub filters: &'static [FilterField],
    /// Whitelist of sort fields
    pub sortable: &'static [&'static str],
    /// Sort field used when the request names none or an unlisted one
    pub default_sort: &'static str,
    /// Timestamp set once at create
    pub created_field: &'static str,
    /// References verified before create
    pub references: &'static [ForeignKey],
    /// Collections whose references block delete
    pub dependents: &'static [Dependent],
    /// Field changed by the narrow update, if the resource has one
    pub updatable: Option<UpdatableField>,
}

/// An entity stored as a document in its own collection
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection, policies and relationships
    const CONFIG: ResourceConfig;

    /// Structural and cross-field validation
    ///
    /// An empty result means the entity may be stored.
    fn validate(&self) -> FieldErrors;
}
