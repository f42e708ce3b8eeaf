use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{
    ids::DocumentId,
    repository::{Dependent, FilterField, Resource, ResourceConfig},
    validation::{text, FieldErrors},
};

/// Grouping for jobs; cannot be deleted while a job uses it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobCategory {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Category name
    #[serde(default)]
    pub name: String,
    /// What jobs in the category cover
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

impl Resource for JobCategory {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "jobcategories",
        type_name: "JobCategory",
        entity: "job category",
        filters: &[
            FilterField::contains("name"),
            FilterField::contains("description"),
        ],
        sortable: &["name", "description", "created_time"],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[],
        dependents: &[Dependent {
            collection: "jobs",
            field: "category_id",
            entity: "job",
        }],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(text("name", &self.name).required().min_len(3).max_len(100));
        errors.check(
            text("description", &self.description)
                .required()
                .min_len(10)
                .max_len(500),
        );
        errors
    }
}
