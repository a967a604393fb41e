use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};

use super::shell;
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::services::RedirectDecision;
use crate::state::AppState;

/// GET /setup
///
/// Signed-out callers go home, owners go to their first store, and everyone
/// else gets the store creation prompt. Nothing is cached between requests.
pub async fn setup_page(State(state): State<AppState>, caller: Caller) -> Result<Response, ApiError> {
    let decision = state
        .tenants()
        .redirect_target(caller.id())
        .await
        .map_err(|e| ApiError::from_database("[SETUP_LAYOUT]", e))?;

    match decision {
        RedirectDecision::Redirect(target) => Ok(Redirect::temporary(&target).into_response()),
        RedirectDecision::Render => Ok(shell::render(&state.config, &caller, SETUP_PROMPT).into_response()),
    }
}

const SETUP_PROMPT: &str = r#"<section id="store-setup">
<h1>Create store</h1>
<p>Add a store to start managing your catalog.</p>
<form method="post" action="/api/stores" data-modal="create-store">
<label for="store-name">Name</label>
<input id="store-name" name="name" required>
<button type="submit">Continue</button>
</form>
</section>"#;
