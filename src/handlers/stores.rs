//! Store (tenant) management for the signed-in owner.
//!
//! Endpoints:
//! - POST   /api/stores            create a store owned by the caller
//! - GET    /api/stores            stores owned by the caller
//! - PATCH  /api/stores/:store_id  rename
//! - DELETE /api/stores/:store_id  delete; refused while catalog rows remain

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::Value;

use super::guard::{authorize, parse_body, store_id_violation};
use crate::database::{Record, Store};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::resources::{validate, STORE_FIELDS};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(stores_get).post(stores_post))
        .route("/api/stores/:store_id", patch(store_patch).delete(store_delete))
}

fn store_name(fields: &Record) -> Result<String, ApiError> {
    match fields.get("name") {
        Some(Value::String(name)) => Ok(name.clone()),
        _ => Err(ApiError::bad_request("Name is required")),
    }
}

/// POST /api/stores
pub async fn stores_post(State(state): State<AppState>, caller: Caller, body: Bytes) -> Result<Json<Store>, ApiError> {
    let tag = "[STORES_POST]";
    let user_id = caller.require()?;
    let payload = parse_body(&body)?;
    let fields = validate(STORE_FIELDS, &payload).map_err(ApiError::validation_error)?;
    let name = store_name(&fields)?;

    let store = state
        .datastore
        .create_store(user_id, &name)
        .await
        .map_err(|e| ApiError::from_database(tag, e))?;

    tracing::info!("{} created store {} for {}", tag, store.id, user_id);
    Ok(Json(store))
}

/// GET /api/stores
pub async fn stores_get(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<Store>>, ApiError> {
    let user_id = caller.require()?;
    let stores = state
        .datastore
        .stores_owned_by(user_id)
        .await
        .map_err(|e| ApiError::from_database("[STORES_GET]", e))?;
    Ok(Json(stores))
}

/// PATCH /api/stores/:store_id
pub async fn store_patch(
    State(state): State<AppState>,
    caller: Caller,
    Path(store_id): Path<String>,
    body: Bytes,
) -> Result<Json<Store>, ApiError> {
    let tag = "[STORE_PATCH]";
    let user_id = caller.require()?;
    let payload = parse_body(&body)?;

    let mut violations: Vec<_> = store_id_violation(&store_id).into_iter().collect();
    let fields = match validate(STORE_FIELDS, &payload) {
        Ok(fields) => Some(fields),
        Err(mut field_violations) => {
            violations.append(&mut field_violations);
            None
        }
    };
    let fields = match fields {
        Some(fields) if violations.is_empty() => fields,
        _ => return Err(ApiError::validation_error(violations)),
    };
    let name = store_name(&fields)?;

    authorize(&state, user_id, &store_id, tag).await?;

    state
        .datastore
        .rename_store(&store_id, user_id, &name)
        .await
        .map_err(|e| ApiError::from_database(tag, e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Store not found"))
}

/// DELETE /api/stores/:store_id
pub async fn store_delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(store_id): Path<String>,
) -> Result<Json<Store>, ApiError> {
    let tag = "[STORE_DELETE]";
    let user_id = caller.require()?;
    if let Some(violation) = store_id_violation(&store_id) {
        return Err(ApiError::validation_error(vec![violation]));
    }
    authorize(&state, user_id, &store_id, tag).await?;

    let store = state
        .datastore
        .delete_store(&store_id, user_id)
        .await
        .map_err(|e| ApiError::from_database(tag, e))?
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    tracing::info!("{} deleted store {}", tag, store.id);
    Ok(Json(store))
}
