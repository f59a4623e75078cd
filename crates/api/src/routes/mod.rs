pub mod auth;
pub mod generation;
pub mod health;
pub mod project;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth                          auth::router
/// /projects                      project::router (nests tasks, generation, conversations)
/// /tasks                         task::router
/// /generate                      generation::router
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/generate", generation::router())
}
