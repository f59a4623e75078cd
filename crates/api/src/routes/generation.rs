//! Route definitions for the `/generate` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generate`.
///
/// ```text
/// POST /tasks -> generate_drafts
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/tasks", post(generation::generate_drafts))
}
