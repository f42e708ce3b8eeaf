use serde::{Deserialize, Serialize};

use super::{Timestamp, PROFICIENCY_LEVELS};
use crate::{
    ids::DocumentId,
    repository::{FilterField, ForeignKey, Resource, ResourceConfig, UpdatableField},
    validation::{required_id, text, FieldErrors},
};

/// Skill held by a candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Candidate this belongs to
    #[serde(default)]
    pub candidate_id: Option<DocumentId>,
    /// Skill being described
    #[serde(default)]
    pub skill_id: Option<DocumentId>,
    /// Self-assessed strength, one of `PROFICIENCY_LEVELS`
    #[serde(default)]
    pub proficiency_level: String,
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

impl Resource for CandidateSkill {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "candidateskills",
        type_name: "CandidateSkill",
        entity: "candidate skill",
        filters: &[
            FilterField::exact_id("candidate_id"),
            FilterField::exact_id("skill_id"),
            FilterField::contains("proficiency_level"),
        ],
        sortable: &["candidate_id", "skill_id", "proficiency_level", "created_time"],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[
            ForeignKey {
                field: "candidate_id",
                collection: "candidates",
                entity: "candidate",
            },
            ForeignKey {
                field: "skill_id",
                collection: "skills",
                entity: "skill",
            },
        ],
        dependents: &[],
        updatable: Some(UpdatableField {
            field: "proficiency_level",
            allowed: PROFICIENCY_LEVELS,
        }),
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(required_id("candidate_id", &self.candidate_id));
        errors.check(required_id("skill_id", &self.skill_id));
        errors.check(
            text("proficiency_level", &self.proficiency_level)
                .required()
                .one_of(PROFICIENCY_LEVELS),
        );
        errors
    }
}
