//! Handlers for the `/projects` resource.
//!
//! Every query is scoped to the caller; another user's project is a 404.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskforge_core::types::DbId;
use taskforge_core::validation::{normalize_description, validate_project_name};
use taskforge_db::models::project::{CreateProject, Project, UpdateProject};
use taskforge_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load a project owned by `user`, or 404.
pub(crate) async fn owned_project(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Project> {
    ProjectRepo::find_for_user(&state.pool, user.user_id, id)
        .await?
        .ok_or(AppError::not_found("Project", id))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let input = CreateProject {
        name: validate_project_name(&input.name)?,
        description: normalize_description(input.description.as_deref()),
    };
    let project = ProjectRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(project_id = project.id, user_id = user.user_id, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Project>>> {
    let projects = ProjectRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    Ok(Json(owned_project(&state, &user, id).await?))
}

/// PUT /api/v1/projects/{id}
///
/// A blank description clears it, matching `create`.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let input = UpdateProject {
        name: input
            .name
            .as_deref()
            .map(validate_project_name)
            .transpose()?,
        description: input
            .description
            .map(|d| normalize_description(Some(d.as_str())).unwrap_or_default()),
    };
    let project = ProjectRepo::update(&state.pool, user.user_id, id, &input)
        .await?
        .ok_or(AppError::not_found("Project", id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Tasks and conversations are removed by cascade.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProjectRepo::delete(&state.pool, user.user_id, id).await? {
        tracing::info!(project_id = id, user_id = user.user_id, "Deleted project");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Project", id))
    }
}
