// Checks shared by every tenant-scoped handler

use axum::body::Bytes;
use serde_json::Value;

use crate::error::ApiError;
use crate::resources::FieldViolation;
use crate::state::AppState;

/// Request body as JSON; an empty body is `null` so every required field reports missing
pub fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejecting request body: {}", e);
        ApiError::invalid_json("Invalid JSON body")
    })
}

/// Violation for an empty store path parameter
pub fn store_id_violation(store_id: &str) -> Option<FieldViolation> {
    store_id
        .trim()
        .is_empty()
        .then(|| FieldViolation::required("storeId", "Store ID"))
}

/// `403 Unauthorized` unless `user_id` owns `store_id`
pub async fn authorize(state: &AppState, user_id: &str, store_id: &str, tag: &str) -> Result<(), ApiError> {
    let owned = state
        .tenants()
        .verify_ownership(user_id, store_id)
        .await
        .map_err(|e| ApiError::from_database(tag, e))?;

    if owned {
        Ok(())
    } else {
        tracing::debug!("{} caller {} does not own store {}", tag, user_id, store_id);
        Err(ApiError::forbidden("Unauthorized"))
    }
}
