//! Handlers for tasks: project-scoped listing and batch creation, plus
//! `/tasks/{id}` updates and deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskforge_core::types::DbId;
use taskforge_core::validation::{validate_estimated_hours, validate_task_title};
use taskforge_db::models::task::{CreateTask, Task, UpdateTask, UpdateTaskStatus};
use taskforge_db::repositories::TaskRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::project::owned_project;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/tasks
///
/// Ascending by `order`.
pub async fn list_by_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    owned_project(&state, &user, project_id).await?;
    let tasks = TaskRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(tasks))
}

/// POST /api/v1/projects/{project_id}/tasks
///
/// Bulk insert. `order` continues from the project's current task count and
/// follows input order.
pub async fn create_many(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(inputs): Json<Vec<CreateTask>>,
) -> AppResult<(StatusCode, Json<Vec<Task>>)> {
    if inputs.is_empty() {
        return Err(AppError::BadRequest("At least one task is required".into()));
    }
    owned_project(&state, &user, project_id).await?;

    let inputs = inputs
        .into_iter()
        .map(|input| -> AppResult<CreateTask> {
            validate_estimated_hours(input.estimated_hours)?;
            Ok(CreateTask {
                title: validate_task_title(&input.title)?,
                ..input
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let tasks = TaskRepo::create_many(&state.pool, project_id, &inputs).await?;
    Ok((StatusCode::CREATED, Json(tasks)))
}

/// PUT /api/v1/tasks/{id}
///
/// Partial update; absent fields are left unchanged.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    if input.is_empty() {
        let task = TaskRepo::find_for_user(&state.pool, user.user_id, id)
            .await?
            .ok_or(AppError::not_found("Task", id))?;
        return Ok(Json(task));
    }

    validate_estimated_hours(input.estimated_hours)?;
    let input = UpdateTask {
        title: input.title.as_deref().map(validate_task_title).transpose()?,
        ..input
    };

    let task = TaskRepo::update(&state.pool, user.user_id, id, &input)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    Ok(Json(task))
}

/// PATCH /api/v1/tasks/{id}/status
///
/// Any status may move to any other.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskStatus>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::update_status(&state.pool, user.user_id, id, input.status)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    tracing::debug!(task_id = id, status = %task.status, "Moved task");
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, user.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Task", id))
    }
}
