//! Error types for the service process and the document store

use std::fmt;
use thiserror::Error;

// ============================================================================
// Structured Database Errors
// ============================================================================

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Establishing a store connection
    Connect,
    /// Reading documents
    Query,
    /// Counting documents
    Count,
    /// Inserting a document
    Insert,
    /// Updating document fields
    Update,
    /// Deleting a document
    Delete,
    /// Liveness ping
    Ping,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Query => write!(f, "query"),
            Self::Count => write!(f, "count"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Ping => write!(f, "ping"),
        }
    }
}

/// Category of database error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// Failed to establish connection
    ConnectionFailed,
    /// Constraint violation (unique key, duplicate record)
    ConstraintViolation,
    /// Query execution failed
    QueryFailed,
    /// Document could not be converted to or from its stored form
    TypeConversion,
    /// Configuration error
    Configuration,
    /// Operation timed out
    Timeout,
    /// Other/unknown error
    Other,
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::TypeConversion => write!(f, "type_conversion"),
            Self::Configuration => write!(f, "configuration"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured database error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    /// The operation being performed when the error occurred
    pub operation: DatabaseOperation,
    /// The category of error
    pub kind: DatabaseErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional context (e.g., collection name)
    pub context: Option<String>,
}

impl DatabaseError {
    /// Create a new database error
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a query failed error
    pub fn query_failed(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::QueryFailed, message)
    }

    /// Create a type conversion error
    pub fn type_conversion(operation: DatabaseOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatabaseErrorKind::TypeConversion, message)
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::Configuration,
            message,
        )
    }

    /// Check if this error is retriable
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::Timeout
        )
    }

    /// Attach context (usually the collection name)
    #[must_use]
    pub fn add_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatabaseError {}

/// Sanitize a store URL by removing credentials
pub fn sanitize_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let authority_start = scheme_end + 3;
    let authority_end = url[authority_start..]
        .find(['/', '?', '#'])
        .map_or(url.len(), |pos| authority_start + pos);

    // Userinfo ends at the last '@' of the authority; the password may contain '@'
    match url[authority_start..authority_end].rfind('@') {
        Some(at_pos) => format!(
            "{}<redacted>@{}",
            &url[..authority_start],
            &url[authority_start + at_pos + 1..]
        ),
        None => url.to_string(),
    }
}

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Process-level error type
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Structured database error with operation context
    #[error("{0}")]
    Database(DatabaseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<DatabaseError> for Error {
    fn from(err: DatabaseError) -> Self {
        Error::Database(err)
    }
}

#[cfg(feature = "surrealdb")]
impl From<surrealdb::Error> for DatabaseError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();

        let (kind, operation) = if msg.contains("already exists")
            || msg.contains("unique")
            || msg.contains("duplicate")
        {
            (
                DatabaseErrorKind::ConstraintViolation,
                DatabaseOperation::Insert,
            )
        } else if msg.contains("timeout") || msg.contains("timed out") {
            (DatabaseErrorKind::Timeout, DatabaseOperation::Query)
        } else if msg.contains("connect")
            || msg.contains("Connection")
            || msg.contains("auth")
            || msg.contains("signin")
        {
            (
                DatabaseErrorKind::ConnectionFailed,
                DatabaseOperation::Connect,
            )
        } else if msg.contains("parse") || msg.contains("syntax") {
            (DatabaseErrorKind::QueryFailed, DatabaseOperation::Query)
        } else if msg.contains("deserialize") || msg.contains("serialize") {
            (DatabaseErrorKind::TypeConversion, DatabaseOperation::Query)
        } else {
            (DatabaseErrorKind::Other, DatabaseOperation::Query)
        };

        Self::new(operation, kind, msg)
    }
}

// Store failures surface to the repository layer with the operation mapped
impl From<DatabaseError> for crate::repository::RepositoryError {
    fn from(err: DatabaseError) -> Self {
        use crate::repository::{RepositoryErrorKind, RepositoryOperation};

        let kind = match err.kind {
            DatabaseErrorKind::ConstraintViolation => RepositoryErrorKind::ConstraintViolation,
            DatabaseErrorKind::ConnectionFailed => RepositoryErrorKind::ConnectionFailed,
            DatabaseErrorKind::Timeout => RepositoryErrorKind::Timeout,
            DatabaseErrorKind::TypeConversion => RepositoryErrorKind::SerializationError,
            _ => RepositoryErrorKind::DatabaseError,
        };

        let operation = match err.operation {
            DatabaseOperation::Query => RepositoryOperation::FindAll,
            DatabaseOperation::Count => RepositoryOperation::Count,
            DatabaseOperation::Insert => RepositoryOperation::Create,
            DatabaseOperation::Update => RepositoryOperation::Update,
            DatabaseOperation::Delete => RepositoryOperation::Delete,
            _ => RepositoryOperation::FindById,
        };

        let message = match err.context {
            Some(ctx) => format!("{} ({})", err.message, ctx),
            None => err.message,
        };

        Self::new(operation, kind, message)
    }
}
