//! Handlers for AI task generation.
//!
//! Generation never fails from the caller's point of view: upstream errors
//! are absorbed by [`TaskGenerator`](taskforge_llm::TaskGenerator) into the
//! fixed fallback list, and `source` tells the caller which one it got.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use taskforge_core::error::CoreError;
use taskforge_core::generation::{GenerationSource, TaskDraft};
use taskforge_core::types::DbId;
use taskforge_core::validation::validate_generation_description;
use taskforge_db::models::conversation::{Conversation, CreateConversation};
use taskforge_db::models::task::{CreateTask, Task};
use taskforge_db::repositories::{ConversationRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::project::owned_project;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /generate/tasks`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub description: String,
}

/// Request body for `POST /projects/{id}/generate-tasks`.
///
/// Without a description the project's own description is used.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForProjectRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DraftsResponse {
    pub tasks: Vec<TaskDraft>,
    pub source: GenerationSource,
}

#[derive(Debug, Serialize)]
pub struct GeneratedTasksResponse {
    pub tasks: Vec<Task>,
    pub source: GenerationSource,
    pub conversation_id: DbId,
}

/// POST /api/v1/generate/tasks
///
/// Drafts only; nothing is persisted.
pub async fn generate_drafts(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<GenerateRequest>,
) -> AppResult<Json<DraftsResponse>> {
    let description = validate_generation_description(&input.description)?;
    let generated = state.generator.generate(&description).await;
    Ok(Json(DraftsResponse {
        tasks: generated.drafts,
        source: generated.source,
    }))
}

/// POST /api/v1/projects/{id}/generate-tasks
///
/// Generate drafts, persist them as `todo` tasks appended to the project,
/// and record the exchange as a conversation.
pub async fn generate_for_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<GenerateForProjectRequest>,
) -> AppResult<(StatusCode, Json<GeneratedTasksResponse>)> {
    let project = owned_project(&state, &user, project_id).await?;

    let description = input
        .description
        .or(project.description)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Project description is required to generate tasks".into(),
            ))
        })?;
    let description = validate_generation_description(&description)?;

    let generated = state.generator.generate(&description).await;
    let inputs: Vec<CreateTask> = generated.drafts.into_iter().map(CreateTask::from).collect();

    // Tasks and conversation commit together.
    let mut tx = state.pool.begin().await?;
    let tasks = TaskRepo::insert_batch(&mut tx, project_id, &inputs).await?;
    let conversation = ConversationRepo::create(
        &mut *tx,
        &CreateConversation {
            project_id,
            user_message: description,
            ai_response: generated.raw,
            source: generated.source,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        project_id,
        count = tasks.len(),
        source = generated.source.as_str(),
        "Generated project tasks"
    );

    Ok((
        StatusCode::CREATED,
        Json(GeneratedTasksResponse {
            tasks,
            source: generated.source,
            conversation_id: conversation.id,
        }),
    ))
}

/// GET /api/v1/projects/{id}/conversations
///
/// Newest first.
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Conversation>>> {
    owned_project(&state, &user, project_id).await?;
    let conversations = ConversationRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(conversations))
}
