//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped task, generation and conversation routes.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
///
/// GET    /{id}/tasks                -> task::list_by_project
/// POST   /{id}/tasks                -> task::create_many
/// POST   /{id}/generate-tasks       -> generation::generate_for_project
/// GET    /{id}/conversations        -> generation::list_conversations
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route(
            "/{id}/tasks",
            get(task::list_by_project).post(task::create_many),
        )
        .route(
            "/{id}/generate-tasks",
            post(generation::generate_for_project),
        )
        .route("/{id}/conversations", get(generation::list_conversations))
}
