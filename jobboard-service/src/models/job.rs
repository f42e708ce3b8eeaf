use serde::{Deserialize, Serialize};

use super::{Timestamp, JOB_STATUSES, JOB_TYPES};
use crate::{
    ids::DocumentId,
    repository::{FilterField, ForeignKey, Resource, ResourceConfig},
    validation::{positive, required_id, text, FieldErrors},
};

/// Job posting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Job title
    #[serde(default)]
    pub title: String,
    /// Full job description
    #[serde(default)]
    pub description: String,
    /// Recruiter who posted the job
    #[serde(default)]
    pub recruiter_id: Option<DocumentId>,
    /// Employing company
    #[serde(default)]
    pub company_id: Option<DocumentId>,
    /// Job category
    #[serde(default)]
    pub category_id: Option<DocumentId>,
    /// Where the work happens
    #[serde(default)]
    pub location: String,
    /// Employment type, one of `JOB_TYPES`
    #[serde(default)]
    pub job_type: String,
    /// Lower bound of the salary range
    #[serde(default)]
    pub salary_min: i64,
    /// Upper bound of the salary range
    #[serde(default)]
    pub salary_max: i64,
    /// Posting state, one of `JOB_STATUSES`
    #[serde(default)]
    pub status: String,
    /// Whether the job is listed
    #[serde(default)]
    pub active: bool,
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

impl Resource for Job {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "jobs",
        type_name: "Job",
        entity: "job",
        filters: &[
            FilterField::contains("title"),
            FilterField::contains("description"),
            FilterField::contains("location"),
            FilterField::contains("job_type"),
            FilterField::contains("status"),
        ],
        sortable: &[
            "title",
            "description",
            "location",
            "job_type",
            "status",
            "created_time",
        ],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[
            ForeignKey {
                field: "recruiter_id",
                collection: "recruiters",
                entity: "recruiter",
            },
            ForeignKey {
                field: "company_id",
                collection: "companies",
                entity: "company",
            },
            ForeignKey {
                field: "category_id",
                collection: "jobcategories",
                entity: "job category",
            },
        ],
        dependents: &[],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(text("title", &self.title).required().min_len(5).max_len(255));
        errors.check(text("description", &self.description).required().min_len(20));
        errors.check(required_id("recruiter_id", &self.recruiter_id));
        errors.check(required_id("company_id", &self.company_id));
        errors.check(required_id("category_id", &self.category_id));
        errors.check(text("location", &self.location).required().min_len(3));
        errors.check(text("job_type", &self.job_type).required().one_of(JOB_TYPES));
        errors.check(positive("salary_min", self.salary_min));
        errors.check(positive("salary_max", self.salary_max));
        errors.check(text("status", &self.status).required().one_of(JOB_STATUSES));

        if !errors.has("salary_min")
            && !errors.has("salary_max")
            && self.salary_max < self.salary_min
        {
            errors.add("salary_max", "must be greater than or equal to salary_min");
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Job {
        Job {
            title: "Rust Engineer".to_string(),
            description: "Build and run the job board backend".to_string(),
            recruiter_id: Some(DocumentId::new()),
            company_id: Some(DocumentId::new()),
            category_id: Some(DocumentId::new()),
            location: "Remote".to_string(),
            job_type: "full-time".to_string(),
            salary_min: 60_000,
            salary_max: 90_000,
            status: "active".to_string(),
            ..Job::default()
        }
    }

    #[test]
    fn test_valid_job() {
        assert!(valid().validate().is_empty());
        let equal = Job {
            salary_min: 50_000,
            salary_max: 50_000,
            ..valid()
        };
        assert!(equal.validate().is_empty());
    }

    #[test]
    fn test_salary_range_inverted() {
        let job = Job {
            salary_min: 50_000,
            salary_max: 40_000,
            ..valid()
        };
        let errors = job.validate().into_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "salary_max");
        assert_eq!(errors[0].message, "must be greater than or equal to salary_min");
    }

    #[test]
    fn test_salary_range_checked_alongside_other_failures() {
        let job = Job {
            title: "Dev".to_string(),
            salary_min: 50_000,
            salary_max: 40_000,
            ..valid()
        };
        let errors = job.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.has("title") && errors.has("salary_max"));
    }

    #[test]
    fn test_salary_range_skipped_when_salary_missing() {
        let job = Job {
            salary_min: 50_000,
            salary_max: 0,
            ..valid()
        };
        let errors = job.validate().into_vec();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "salary_max");
        assert_eq!(errors[0].message, "This field is required");
    }

    #[test]
    fn test_enums_and_references() {
        let job = Job {
            job_type: "internship".to_string(),
            status: "open".to_string(),
            category_id: None,
            ..valid()
        };
        let errors = job.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.has("job_type") && errors.has("status") && errors.has("category_id"));
    }
}
