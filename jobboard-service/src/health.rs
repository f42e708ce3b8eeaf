//! Health check handlers

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    pub version: String,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check (liveness probe)
///
/// Always returns 200 OK if the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check (readiness probe)
///
/// Returns 200 OK when the document store answers a ping within the
/// request timeout, 503 Service Unavailable otherwise.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let ping = tokio::time::timeout(state.config().request_timeout(), store.ping()).await;

    let store_status = match ping {
        Ok(Ok(())) => DependencyStatus {
            healthy: true,
            message: Some(format!("Connected ({})", store.backend())),
        },
        Ok(Err(e)) => {
            tracing::error!("Document store health check failed: {}", e);
            DependencyStatus {
                healthy: false,
                message: Some(format!("{} unavailable: {}", store.backend(), e.kind)),
            }
        }
        Err(_) => {
            tracing::error!("Document store health check timed out");
            DependencyStatus {
                healthy: false,
                message: Some("Ping timed out".to_string()),
            }
        }
    };

    let ready = store_status.healthy;
    let mut dependencies = HashMap::new();
    dependencies.insert("store".to_string(), store_status);

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    (status_code, Json(response))
}
