//! API error types for handler operations
//!
//! Handlers are the only layer that turns a failure into a status code.
//! Field-level failures are rendered as `{"errors": [{field, message}]}`;
//! everything else uses a `{error, code, status}` body that never carries
//! store detail.
//!
//! # Example
//!
//! ```rust
//! use jobboard_service::handlers::{ApiError, ApiErrorKind};
//!
//! let error = ApiError::not_found("Job", "0192f5c4-8f3e-7cc1-bf7a-0d3e5e1d2a11");
//! assert!(matches!(error.kind, ApiErrorKind::NotFound));
//! assert_eq!(error.kind.status_code().as_u16(), 404);
//! ```

use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation},
    service::ServiceError,
    validation::{FieldError, FieldErrors},
};

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing a page of entities
    List,
    /// Listing the children of a parent entity
    ListRelated,
    /// Getting a single entity by ID
    Get,
    /// Creating a new entity
    Create,
    /// Updating a single field
    Update,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::ListRelated => write!(f, "list_related"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Entity was not found, or its identifier did not parse
    NotFound,
    /// Delete refused while other entities reference the target
    Blocked,
    /// Payload failed field validation
    ValidationFailed,
    /// A foreign key in the payload did not resolve
    InvalidReference,
    /// Body could not be decoded
    BadRequest,
    /// Internal server error
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Blocked => write!(f, "blocked"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::InvalidReference => write!(f, "invalid_reference"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    ///
    /// A blocked delete is reported as not found.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::Blocked => StatusCode::NOT_FOUND,
            Self::ValidationFailed | Self::InvalidReference | Self::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error kind
    #[must_use]
    pub fn error_code(&self) -> String {
        format!("{}", self).to_uppercase()
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Job", "JobCategory")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
    /// Per-field failures, rendered as an `errors` list
    pub field_errors: Option<FieldErrors>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
            field_errors: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(ApiOperation::Get, ApiErrorKind::NotFound, "Entity not found")
            .with_entity(entity_type, entity_id)
    }

    /// Create a validation error carrying every failed field
    pub fn validation_failed(errors: FieldErrors) -> Self {
        let mut error = Self::new(
            ApiOperation::Create,
            ApiErrorKind::ValidationFailed,
            "Validation failed",
        );
        error.field_errors = Some(errors);
        error
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiOperation::Create, ApiErrorKind::BadRequest, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: ApiOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response body for API errors
#[derive(Debug, Serialize, Deserialize)]
struct ApiErrorResponse {
    error: String,
    code: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity_id: Option<String>,
}

/// Response body for field-level failures
#[derive(Debug, Serialize)]
struct FieldErrorResponse {
    errors: FieldErrors,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        if status.is_server_error() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "API error: {}", self.message
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                entity_type = ?self.entity_type,
                entity_id = ?self.entity_id,
                "API error: {}", self.message
            );
        }

        if let Some(errors) = self.field_errors {
            return (status, Json(FieldErrorResponse { errors })).into_response();
        }

        let response = ApiErrorResponse {
            error: self.message,
            code: self.kind.error_code(),
            status: status.as_u16(),
            operation: Some(self.operation.to_string()),
            entity_type: self.entity_type,
            entity_id: self.entity_id,
        };

        (status, Json(response)).into_response()
    }
}

/// Convert RepositoryOperation to ApiOperation
fn repository_operation_to_api_operation(op: RepositoryOperation) -> ApiOperation {
    match op {
        RepositoryOperation::FindById => ApiOperation::Get,
        RepositoryOperation::FindAll | RepositoryOperation::Count => ApiOperation::List,
        RepositoryOperation::FindByReference => ApiOperation::ListRelated,
        RepositoryOperation::Create => ApiOperation::Create,
        RepositoryOperation::Update => ApiOperation::Update,
        RepositoryOperation::Delete => ApiOperation::Delete,
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let operation = repository_operation_to_api_operation(err.operation);

        match err.kind {
            RepositoryErrorKind::NotFound => Self {
                operation,
                kind: ApiErrorKind::NotFound,
                message: "Entity not found".to_string(),
                entity_type: err.entity_type,
                entity_id: err.entity_id,
                field_errors: None,
            },
            // Store failures never reach the client in detail
            RepositoryErrorKind::ConstraintViolation
            | RepositoryErrorKind::ConnectionFailed
            | RepositoryErrorKind::Timeout
            | RepositoryErrorKind::DatabaseError
            | RepositoryErrorKind::SerializationError
            | RepositoryErrorKind::Other => Self {
                operation,
                kind: ApiErrorKind::InternalError,
                message: "An internal error occurred".to_string(),
                entity_type: err.entity_type,
                entity_id: None,
                field_errors: None,
            },
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => Self::validation_failed(errors),
            ServiceError::ReferenceNotFound { field, entity } => {
                let mut error = Self::new(
                    ApiOperation::Create,
                    ApiErrorKind::InvalidReference,
                    format!("{} not found", entity),
                );
                error.field_errors =
                    Some(FieldError::new(field, format!("{} not found", entity)).into());
                error
            }
            ServiceError::Blocked {
                entity,
                id,
                dependent,
                count,
            } => Self::new(
                ApiOperation::Delete,
                ApiErrorKind::Blocked,
                format!("{} is still referenced by {} {}(s)", entity, count, dependent),
            )
            .with_entity(entity, id),
            ServiceError::Repository(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
