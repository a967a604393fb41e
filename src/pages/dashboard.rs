use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use super::shell::{self, escape};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::resources::CATALOG;
use crate::state::AppState;

/// GET /:store_id
pub async fn dashboard_page(
    State(state): State<AppState>,
    caller: Caller,
    Path(store_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(user_id) = caller.id() else {
        return Ok(Redirect::temporary("/").into_response());
    };

    let store = state
        .datastore
        .find_owned_store(&store_id, user_id)
        .await
        .map_err(|e| ApiError::from_database("[DASHBOARD_LAYOUT]", e))?;

    let Some(store) = store else {
        return Ok(Redirect::temporary("/").into_response());
    };

    let links: String = CATALOG
        .iter()
        .map(|spec| {
            format!(
                r#"<li><a href="/api/{}/{}">{}</a></li>"#,
                escape(&store.id),
                spec.collection,
                spec.collection
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!(
        "<section id=\"dashboard\" data-store-id=\"{}\">\n<h1>{}</h1>\n<ul>\n{}\n</ul>\n</section>",
        escape(&store.id),
        escape(&store.name),
        links
    );

    Ok(shell::render(&state.config, &caller, &content).into_response())
}
