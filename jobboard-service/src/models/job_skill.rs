use serde::{Deserialize, Serialize};

use super::{Timestamp, PROFICIENCY_LEVELS};
use crate::{
    ids::DocumentId,
    repository::{FilterField, ForeignKey, Resource, ResourceConfig, UpdatableField},
    validation::{required_id, text, FieldErrors},
};

/// Skill asked for by a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSkill {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Job this belongs to
    #[serde(default)]
    pub job_id: Option<DocumentId>,
    /// Skill being described
    #[serde(default)]
    pub skill_id: Option<DocumentId>,
    /// Minimum strength expected, one of `PROFICIENCY_LEVELS`
    #[serde(default)]
    pub proficiency_level_required: String,
    /// Whether the skill is mandatory for the job
    #[serde(default)]
    pub is_required: bool,
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

impl Resource for JobSkill {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "jobskills",
        type_name: "JobSkill",
        entity: "job skill",
        filters: &[
            FilterField::exact_id("job_id"),
            FilterField::exact_id("skill_id"),
            FilterField::contains("proficiency_level_required"),
        ],
        sortable: &[
            "job_id",
            "skill_id",
            "proficiency_level_required",
            "created_time",
        ],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[
            ForeignKey {
                field: "job_id",
                collection: "jobs",
                entity: "job",
            },
            ForeignKey {
                field: "skill_id",
                collection: "skills",
                entity: "skill",
            },
        ],
        dependents: &[],
        updatable: Some(UpdatableField {
            field: "proficiency_level_required",
            allowed: PROFICIENCY_LEVELS,
        }),
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(required_id("job_id", &self.job_id));
        errors.check(required_id("skill_id", &self.skill_id));
        errors.check(
            text("proficiency_level_required", &self.proficiency_level_required)
                .required()
                .one_of(PROFICIENCY_LEVELS),
        );
        errors
    }
}
