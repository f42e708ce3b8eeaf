use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{
    ids::DocumentId,
    repository::{FilterField, ForeignKey, Resource, ResourceConfig},
    validation::{required_id, text, FieldErrors},
};

/// Uploaded CV; the file itself lives elsewhere
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Candidate this belongs to
    #[serde(default)]
    pub candidate_id: Option<DocumentId>,
    /// Where the file can be fetched
    #[serde(default)]
    pub file_url: String,
    /// Original file name
    #[serde(default)]
    pub file_name: String,
    /// When the file was uploaded
    #[serde(default)]
    pub uploaded_time: Timestamp,
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

impl Resource for Resume {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "resumes",
        type_name: "Resume",
        entity: "resume",
        filters: &[
            FilterField::exact_id("candidate_id"),
            FilterField::contains("file_name"),
        ],
        sortable: &["file_name", "uploaded_time"],
        default_sort: "uploaded_time",
        created_field: "uploaded_time",
        references: &[ForeignKey {
            field: "candidate_id",
            collection: "candidates",
            entity: "candidate",
        }],
        dependents: &[],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(required_id("candidate_id", &self.candidate_id));
        errors.check(text("file_url", &self.file_url).required().url());
        errors.check(text("file_name", &self.file_name).required().min_len(3));
        errors
    }
}
