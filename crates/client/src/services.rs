//! Service seams between client views and the backend.
//!
//! Views depend on these traits rather than on [`ApiClient`](crate::ApiClient)
//! so the board, dashboard and workflows can run against any backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskforge_core::generation::GenerationSource;
use taskforge_core::task::TaskStatus;
use taskforge_core::types::DbId;
use taskforge_db::models::project::{CreateProject, Project, UpdateProject};
use taskforge_db::models::task::{CreateTask, Task, UpdateTask};
use taskforge_db::models::user::UserResponse;

use crate::error::ClientResult;

/// Tokens worth keeping across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// An established session as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthSession {
    pub fn tokens(&self) -> StoredTokens {
        StoredTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Tasks generated into a project and the conversation that recorded them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedTasks {
    pub tasks: Vec<Task>,
    pub source: GenerationSource,
    pub conversation_id: DbId,
}

/// Establishes and ends sessions with the authentication provider.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_anonymously(&self) -> ClientResult<AuthSession>;

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthSession>;

    /// Exchange a refresh token for a new session. The old token is spent.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthSession>;

    /// Revoke every session of the current user.
    async fn sign_out(&self) -> ClientResult<()>;
}

/// Projects owned by the signed-in user.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn create_project(&self, input: &CreateProject) -> ClientResult<Project>;

    /// Newest first.
    async fn list_projects(&self) -> ClientResult<Vec<Project>>;

    async fn get_project(&self, id: DbId) -> ClientResult<Project>;

    async fn update_project(&self, id: DbId, input: &UpdateProject) -> ClientResult<Project>;

    /// Deletes the project's tasks along with it.
    async fn delete_project(&self, id: DbId) -> ClientResult<()>;
}

/// Tasks within a project.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Appends in input order after the project's existing tasks.
    async fn create_tasks(&self, project_id: DbId, inputs: &[CreateTask])
        -> ClientResult<Vec<Task>>;

    /// Ascending by `order`.
    async fn list_tasks(&self, project_id: DbId) -> ClientResult<Vec<Task>>;

    async fn update_task_status(&self, task_id: DbId, status: TaskStatus) -> ClientResult<Task>;

    async fn update_task(&self, task_id: DbId, input: &UpdateTask) -> ClientResult<Task>;

    async fn delete_task(&self, task_id: DbId) -> ClientResult<()>;
}

/// Server-side generation of a project's initial tasks.
#[async_trait]
pub trait TaskGeneration: Send + Sync {
    /// Generate from `description` (or the project's own description when
    /// `None`) and persist the result as `todo` tasks.
    async fn generate_project_tasks(
        &self,
        project_id: DbId,
        description: Option<&str>,
    ) -> ClientResult<GeneratedTasks>;
}
