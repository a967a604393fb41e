//! Server-rendered pages. Every page goes through [`shell::render`].

use axum::{extract::State, response::Html, routing::get, Router};

use crate::middleware::Caller;
use crate::state::AppState;

pub mod dashboard;
pub mod setup;
pub mod shell;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing_page))
        .route("/setup", get(setup::setup_page))
        .route("/:store_id", get(dashboard::dashboard_page))
}

/// GET /
async fn landing_page(State(state): State<AppState>, caller: Caller) -> Html<String> {
    let content = match caller.id() {
        Some(_) => r#"<section id="landing"><a href="/setup">Open your store</a></section>"#,
        None => r#"<section id="landing"><p>Sign in to manage your stores.</p></section>"#,
    };
    shell::render(&state.config, &caller, content)
}
