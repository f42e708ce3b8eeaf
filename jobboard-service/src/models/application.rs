use serde::{Deserialize, Serialize};

use super::{Timestamp, APPLICATION_STATUSES};
use crate::{
    ids::DocumentId,
    repository::{FilterField, ForeignKey, Resource, ResourceConfig, UpdatableField},
    validation::{required_id, text, FieldErrors},
};

/// A candidate's application to a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Job this belongs to
    #[serde(default)]
    pub job_id: Option<DocumentId>,
    /// Candidate this belongs to
    #[serde(default)]
    pub candidate_id: Option<DocumentId>,
    /// Review state, one of `APPLICATION_STATUSES`
    #[serde(default)]
    pub status: String,
    /// Free-form note from the recruiter
    #[serde(default)]
    pub recruiter_note: String,
    /// When the application was submitted
    #[serde(default)]
    pub applied_time: Timestamp,
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

impl Resource for Application {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "applications",
        type_name: "Application",
        entity: "application",
        filters: &[
            FilterField::contains("status"),
            FilterField::exact_id("job_id"),
            FilterField::exact_id("candidate_id"),
        ],
        sortable: &["status", "job_id", "candidate_id", "applied_time"],
        default_sort: "applied_time",
        created_field: "applied_time",
        references: &[
            ForeignKey {
                field: "job_id",
                collection: "jobs",
                entity: "job",
            },
            ForeignKey {
                field: "candidate_id",
                collection: "candidates",
                entity: "candidate",
            },
        ],
        dependents: &[],
        updatable: Some(UpdatableField {
            field: "status",
            allowed: APPLICATION_STATUSES,
        }),
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(required_id("job_id", &self.job_id));
        errors.check(required_id("candidate_id", &self.candidate_id));
        errors.check(text("status", &self.status).required().one_of(APPLICATION_STATUSES));
        errors
    }
}
