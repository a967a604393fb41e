use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::resources::CATALOG;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(root))
        .route("/health", get(health))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let collections: Vec<String> = CATALOG
        .iter()
        .map(|spec| format!("/api/:storeId/{}[/:id]", spec.collection))
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "name": state.config.api.app_title,
            "version": version,
            "description": "Multi-tenant store admin API",
            "endpoints": {
                "home": "/ (public)",
                "setup": "/setup (redirects to the caller's first store)",
                "dashboard": "/:storeId (store owner)",
                "stores": "/api/stores[/:storeId] (signed in)",
                "catalog": collections,
                "health": "/health (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.datastore.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
