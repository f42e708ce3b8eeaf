use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{
    ids::DocumentId,
    repository::{FilterField, Resource, ResourceConfig},
    validation::{text, FieldErrors},
};

/// Employer publishing jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Company name
    #[serde(default)]
    pub name: String,
    /// What the company does
    #[serde(default)]
    pub description: String,
    /// Company website URL
    #[serde(default)]
    pub website: String,
    /// Contact email address
    #[serde(default)]
    pub email: String,
    /// Contact phone number
    #[serde(default)]
    pub phone: String,
    /// Street address
    #[serde(default)]
    pub address: String,
    /// City
    #[serde(default)]
    pub city: String,
    /// Postal code
    #[serde(default)]
    pub postal_code: String,
    /// Country
    #[serde(default)]
    pub country: String,
    /// Logo image URL
    #[serde(default)]
    pub logo_url: String,
    /// Whether the company has been verified
    #[serde(default)]
    pub verified: bool,
    /// Whether the company is listed
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

impl Resource for Company {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "companies",
        type_name: "Company",
        entity: "company",
        filters: &[
            FilterField::contains("name"),
            FilterField::contains("country"),
            FilterField::contains("city"),
            FilterField::contains("postal_code"),
            FilterField::any_of("location", &["country", "city", "postal_code"]),
        ],
        sortable: &["name", "country", "city", "postal_code", "created_time"],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[],
        dependents: &[],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(text("name", &self.name).required().min_len(3).max_len(255));
        errors.check(text("description", &self.description).optional().min_len(10));
        errors.check(text("website", &self.website).required().url());
        errors.check(text("email", &self.email).required().email());
        errors.check(text("phone", &self.phone).required().min_len(10));
        errors.check(text("city", &self.city).required());
        errors.check(text("country", &self.country).required());
        errors.check(text("logo_url", &self.logo_url).optional().url());
        errors
    }
}
