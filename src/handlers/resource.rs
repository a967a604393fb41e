//! Generic handlers for store-scoped catalog entities.
//!
//! One [`ResourceSpec`] yields the full route set:
//!
//! | Method | Path | Caller |
//! |---|---|---|
//! | GET | `/api/:store_id/{collection}` | anyone, unless reads are closed |
//! | POST | `/api/:store_id/{collection}` | store owner |
//! | GET | `/api/:store_id/{collection}/:resource_id` | anyone, unless reads are closed |
//! | PATCH | `/api/:store_id/{collection}/:resource_id` | store owner |
//! | DELETE | `/api/:store_id/{collection}/:resource_id` | store owner |
//!
//! Every handler checks in the same order: caller, request shape, ownership,
//! then the datastore call. Writes also confirm that every reference field
//! names a row of the same store before touching the datastore.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::guard::{authorize, parse_body, store_id_violation};
use crate::database::Record;
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::resources::{by_collection, validate, FieldViolation, ResourceSpec};
use crate::state::AppState;

/// Build the routes for one catalog entity
pub fn routes(spec: &'static ResourceSpec) -> Router<AppState> {
    let collection_path = format!("/api/:store_id/{}", spec.collection);
    let item_path = format!("{}/:resource_id", collection_path);

    Router::new()
        .route(
            &collection_path,
            get(move |State(state): State<AppState>, caller: Caller, Path(store_id): Path<String>| {
                list(spec, state, caller, store_id)
            })
            .post(
                move |State(state): State<AppState>, caller: Caller, Path(store_id): Path<String>, body: Bytes| {
                    create(spec, state, caller, store_id, body)
                },
            ),
        )
        .route(
            &item_path,
            get(
                move |State(state): State<AppState>,
                      caller: Caller,
                      Path((store_id, resource_id)): Path<(String, String)>| {
                    show(spec, state, caller, store_id, resource_id)
                },
            )
            .patch(
                move |State(state): State<AppState>,
                      caller: Caller,
                      Path((store_id, resource_id)): Path<(String, String)>,
                      body: Bytes| { update(spec, state, caller, store_id, resource_id, body) },
            )
            .delete(
                move |State(state): State<AppState>,
                      caller: Caller,
                      Path((store_id, resource_id)): Path<(String, String)>| {
                    remove(spec, state, caller, store_id, resource_id)
                },
            ),
        )
}

/// Path violations for a request addressing `store_id` and optionally one record
fn scope_violations(spec: &ResourceSpec, store_id: &str, resource_id: Option<&str>) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = store_id_violation(store_id).into_iter().collect();
    if resource_id.is_some_and(|id| id.trim().is_empty()) {
        violations.push(FieldViolation {
            field: "id".to_string(),
            message: spec.id_required(),
        });
    }
    violations
}

fn require_scope(spec: &ResourceSpec, store_id: &str, resource_id: Option<&str>) -> Result<(), ApiError> {
    let violations = scope_violations(spec, store_id, resource_id);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(violations))
    }
}

/// Path and body checked together so every violation is reported at once
fn validate_write(
    spec: &ResourceSpec,
    store_id: &str,
    resource_id: Option<&str>,
    body: &Bytes,
) -> Result<Record, ApiError> {
    let payload = parse_body(body)?;
    let mut violations = scope_violations(spec, store_id, resource_id);

    match validate(spec.fields, &payload) {
        Ok(fields) if violations.is_empty() => Ok(fields),
        Ok(_) => Err(ApiError::validation_error(violations)),
        Err(mut field_violations) => {
            violations.append(&mut field_violations);
            Err(ApiError::validation_error(violations))
        }
    }
}

/// `400` naming every reference field whose row is not part of `store_id`
async fn require_scoped_references(
    spec: &ResourceSpec,
    state: &AppState,
    store_id: &str,
    fields: &Record,
    tag: &str,
) -> Result<(), ApiError> {
    let mut violations = Vec::new();

    for field in spec.fields {
        let Some(collection) = field.references() else {
            continue;
        };
        let Some(id) = fields.get(field.name).and_then(|value| value.as_str()) else {
            continue;
        };
        let target = by_collection(collection).ok_or_else(|| {
            ApiError::internal(tag, format!("{} references unknown collection {}", spec.name, collection))
        })?;

        let found = state
            .datastore
            .find_resource(target, store_id, id)
            .await
            .map_err(|e| ApiError::from_database(tag, e))?;
        if found.is_none() {
            violations.push(FieldViolation {
                field: field.name.to_string(),
                message: format!("{} does not belong to this store", field.label),
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(violations))
    }
}

/// Caller and ownership check for reads, skipped while catalog reads are public
async fn guard_read(
    spec: &ResourceSpec,
    state: &AppState,
    caller: &Caller,
    store_id: &str,
    resource_id: Option<&str>,
    tag: &str,
) -> Result<(), ApiError> {
    if state.config.security.public_catalog_reads {
        return require_scope(spec, store_id, resource_id);
    }

    let user_id = caller.require()?;
    require_scope(spec, store_id, resource_id)?;
    authorize(state, user_id, store_id, tag).await
}

/// POST /api/:store_id/{collection}
pub async fn create(
    spec: &ResourceSpec,
    state: AppState,
    caller: Caller,
    store_id: String,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let tag = spec.collection_tag("POST");
    let user_id = caller.require()?;
    let fields = validate_write(spec, &store_id, None, &body)?;
    authorize(&state, user_id, &store_id, &tag).await?;
    require_scoped_references(spec, &state, &store_id, &fields, &tag).await?;

    let record = state
        .datastore
        .insert_resource(spec, &store_id, &fields)
        .await
        .map_err(|e| ApiError::from_database(&tag, e))?;

    tracing::info!("{} created {} in store {}", tag, spec.name, store_id);
    Ok(Json(record))
}

/// GET /api/:store_id/{collection}
pub async fn list(
    spec: &ResourceSpec,
    state: AppState,
    caller: Caller,
    store_id: String,
) -> Result<Json<Vec<Record>>, ApiError> {
    let tag = spec.collection_tag("GET");
    guard_read(spec, &state, &caller, &store_id, None, &tag).await?;

    let records = state
        .datastore
        .list_resources(spec, &store_id)
        .await
        .map_err(|e| ApiError::from_database(&tag, e))?;

    Ok(Json(records))
}

/// GET /api/:store_id/{collection}/:resource_id
pub async fn show(
    spec: &ResourceSpec,
    state: AppState,
    caller: Caller,
    store_id: String,
    resource_id: String,
) -> Result<Json<Record>, ApiError> {
    let tag = spec.item_tag("GET");
    guard_read(spec, &state, &caller, &store_id, Some(&resource_id), &tag).await?;

    state
        .datastore
        .find_resource(spec, &store_id, &resource_id)
        .await
        .map_err(|e| ApiError::from_database(&tag, e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(spec.not_found()))
}

/// PATCH /api/:store_id/{collection}/:resource_id
pub async fn update(
    spec: &ResourceSpec,
    state: AppState,
    caller: Caller,
    store_id: String,
    resource_id: String,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let tag = spec.item_tag("PATCH");
    let user_id = caller.require()?;
    let fields = validate_write(spec, &store_id, Some(&resource_id), &body)?;
    authorize(&state, user_id, &store_id, &tag).await?;
    require_scoped_references(spec, &state, &store_id, &fields, &tag).await?;

    state
        .datastore
        .update_resource(spec, &store_id, &resource_id, &fields)
        .await
        .map_err(|e| ApiError::from_database(&tag, e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(spec.not_found()))
}

/// DELETE /api/:store_id/{collection}/:resource_id
pub async fn remove(
    spec: &ResourceSpec,
    state: AppState,
    caller: Caller,
    store_id: String,
    resource_id: String,
) -> Result<Json<Record>, ApiError> {
    let tag = spec.item_tag("DELETE");
    let user_id = caller.require()?;
    require_scope(spec, &store_id, Some(&resource_id))?;
    authorize(&state, user_id, &store_id, &tag).await?;

    let removed = state
        .datastore
        .delete_resource(spec, &store_id, &resource_id)
        .await
        .map_err(|e| ApiError::from_database(&tag, e))?
        .ok_or_else(|| ApiError::not_found(spec.not_found()))?;

    tracing::info!("{} removed {} {} from store {}", tag, spec.name, resource_id, store_id);
    Ok(Json(removed))
}
