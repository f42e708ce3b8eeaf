//! # jobboard-service
//!
//! Job board REST API over a schema-free document store.
//!
//! ## Features
//!
//! - **Generic resources**: one repository, service and handler set instantiated per entity
//! - **Listings**: pagination, whitelisted sorting and per-entity filter policies
//! - **Referential integrity**: foreign keys resolved before create, guarded deletes
//! - **Stores**: in-memory (`mem://`) or SurrealDB (`ws`, `wss`, `http`, `https`)
//! - **Middleware stack**: request tracking, panic recovery, body size limits, CORS
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: bounded drain on SIGTERM/SIGINT
//!
//! ## Example
//!
//! ```rust,no_run
//! use jobboard_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config);
//!
//!     let store = connect(&config.store).await?;
//!     let state = AppState::new(config, store);
//!     let app = router(state.clone());
//!
//!     Server::new(state).serve(app).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod integrity;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
pub mod store;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, IntegrityConfig, StoreConfig};
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::handlers::{ApiError, ApiErrorKind, Created, ListResponse, PaginationMeta};
    pub use crate::health::{health, readiness};
    pub use crate::ids::{DocumentId, RequestId};
    pub use crate::integrity::{ReferenceResolver, StoreReferences, UncheckedReferences};
    pub use crate::middleware::{
        request_id_layer, request_id_propagation_layer, sensitive_headers_layer,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        ListParams, PageRequest, RepositoryError, Resource, ResourceConfig, ResourceRepository,
    };
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::service::{ResourceService, ServiceError};
    pub use crate::state::AppState;
    pub use crate::store::{connect, DocumentStore, Filter, MemoryStore};
    pub use crate::validation::{FieldError, FieldErrors};

    pub use axum::{
        extract::{Path, Query, State},
        routing::{delete, get, post, put},
        Json, Router,
    };
}
