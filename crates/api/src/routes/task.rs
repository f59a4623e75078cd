//! Route definitions for the `/tasks` resource.

use axum::routing::{patch, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// PATCH  /{id}/status  -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(task::update).delete(task::delete))
        .route("/{id}/status", patch(task::update_status))
}
