use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{
    ids::DocumentId,
    repository::{FilterField, Resource, ResourceConfig},
    validation::{text, FieldErrors},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Skill name
    #[serde(default)]
    pub name: String,
    /// Optional longer description
    #[serde(default)]
    pub description: String,
    /// When the record was created
    #[serde(default)]
    pub created_time: Timestamp,
    /// When the record was last changed
    #[serde(default)]
    pub updated_time: Timestamp,
    /// Actor that created the record
    #[serde(default)]
    pub created_by: String,
    /// Actor that last changed the record
    #[serde(default)]
    pub updated_by: String,
}

impl Resource for Skill {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "skills",
        type_name: "Skill",
        entity: "skill",
        filters: &[FilterField::contains("name")],
        sortable: &["name", "created_time"],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[],
        dependents: &[],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(text("name", &self.name).required().min_len(2).max_len(100));
        errors
    }
}
