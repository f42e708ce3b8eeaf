use serde::{Deserialize, Serialize};

use super::Timestamp;
use crate::{
    ids::DocumentId,
    repository::{FilterField, Resource, ResourceConfig},
    validation::{text, FieldErrors},
};

/// Administrator of the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store identifier, assigned on create
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Contact email address
    #[serde(default)]
    pub email: String,
    /// Login password
    #[serde(default)]
    pub password: String,
    /// Whether the account has been verified
    #[serde(default)]
    pub verified: bool,
    /// Whether the account is active
    #[serde(default)]
    pub active: bool,
    /// Whether the current terms were accepted
    #[serde(default)]
    pub terms_accepted: bool,
    /// When the terms were last accepted
    #[serde(default)]
    pub last_terms_accepted: Timestamp,
    /// Most recent login
    #[serde(default)]
    pub last_login_time: Timestamp,
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

impl Resource for User {
    const CONFIG: ResourceConfig = ResourceConfig {
        collection: "users",
        type_name: "User",
        entity: "user",
        filters: &[
            FilterField::contains("first_name"),
            FilterField::contains("last_name"),
            FilterField::contains("email"),
        ],
        sortable: &[
            "first_name",
            "last_name",
            "email",
            "verified",
            "active",
            "created_time",
        ],
        default_sort: "created_time",
        created_field: "created_time",
        references: &[],
        dependents: &[],
        updatable: None,
    };

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(text("first_name", &self.first_name).required().min_len(2).max_len(100));
        errors.check(text("last_name", &self.last_name).required().min_len(2).max_len(100));
        errors.check(text("email", &self.email).required().email());
        errors.check(text("password", &self.password).required().min_len(8));
        errors
    }
}
