//! Handlers shared by every resource
//!
//! Each handler is generic over the entity; the router instantiates them
//! once per resource.

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

use super::{
    error::{ApiError, ApiOperation},
    response::{Created, ListResponse, PaginationMeta},
};
use crate::{
    repository::{ListParams, Resource},
    state::AppState,
};

/// `GET /{collection}`: one page of the filtered, sorted collection
pub async fn list<E: Resource>(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<ListResponse<E>, ApiError> {
    let params = ListParams::from_query(query);
    let (items, total) = state.service::<E>().list(&params).await?;
    Ok(ListResponse::new(items, PaginationMeta::new(params.page, total)))
}

/// `GET /{collection}/{id}`
pub async fn get<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<E>, ApiError> {
    let entity = state.service::<E>().get(&id).await?;
    Ok(Json(entity))
}

/// `POST /{collection}`: validate, check references, insert
pub async fn create<E: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<E>, JsonRejection>,
) -> Result<Created<E>, ApiError> {
    let Json(entity) = payload?;
    let created = state.service::<E>().create(entity).await?;
    Ok(Created(created))
}

/// `DELETE /{collection}/{id}`
pub async fn delete<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service::<E>().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /{collection}/{id}` with `{"<field>": "<value>"}`
///
/// Only the resource's updatable field is read from the body; a missing
/// or non-string value counts as empty.
pub async fn update_field<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::from(e).with_operation(ApiOperation::Update))?;
    let value = E::CONFIG
        .updatable
        .and_then(|updatable| body.get(updatable.field))
        .and_then(Value::as_str)
        .unwrap_or_default();

    state.service::<E>().update_field(&id, value).await?;
    Ok(StatusCode::OK)
}

/// `GET /{parent}/{id}/{children}`: every child whose `field` is the parent id
pub async fn list_related<E: Resource>(
    state: AppState,
    parent_id: String,
    field: &'static str,
) -> Result<Json<Vec<E>>, ApiError> {
    let items = state.service::<E>().list_by(field, &parent_id).await?;
    Ok(Json(items))
}
