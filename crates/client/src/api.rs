//! REST client for the taskforge HTTP API.
//!
//! Wraps every `/api/v1` endpoint the views need using [`reqwest`] and
//! implements the service traits from [`crate::services`]. Non-2xx
//! responses are decoded from the server's `{"error", "code"}` envelope
//! into [`ClientError`].

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use taskforge_core::generation::{GenerationSource, TaskDraft};
use taskforge_core::task::TaskStatus;
use taskforge_core::types::DbId;
use taskforge_db::models::project::{CreateProject, Project, UpdateProject};
use taskforge_db::models::task::{CreateTask, Task, UpdateTask, UpdateTaskStatus};
use taskforge_db::models::user::UserResponse;

use crate::error::{ClientError, ClientResult};
use crate::services::{
    AuthBackend, AuthSession, GeneratedTasks, ProjectDirectory, StoredTokens, TaskGeneration,
    TaskService,
};

/// HTTP client for one taskforge server.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: RwLock<Option<StoredTokens>>,
}

/// Drafts returned by `POST /generate/tasks`. Nothing is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedDrafts {
    pub tasks: Vec<TaskDraft>,
    pub source: GenerationSource,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl ApiClient {
    /// * `base_url` - API root including the version prefix, e.g.
    ///   `http://localhost:3000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the tokens sent with subsequent requests.
    pub fn set_tokens(&self, tokens: Option<StoredTokens>) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = tokens;
        }
    }

    pub fn tokens(&self) -> Option<StoredTokens> {
        self.tokens.read().ok().and_then(|guard| guard.clone())
    }

    /// GET /auth/me
    pub async fn me(&self) -> ClientResult<UserResponse> {
        let response = self.authorized(self.client.get(self.url("/auth/me"))).send().await?;
        Self::parse_response(response).await
    }

    /// POST /generate/tasks
    pub async fn generate_drafts(&self, description: &str) -> ClientResult<GeneratedDrafts> {
        let response = self
            .authorized(self.client.post(self.url("/generate/tasks")))
            .json(&serde_json::json!({ "description": description }))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens() {
            Some(tokens) => builder.bearer_auth(tokens.access_token),
            None => builder,
        }
    }

    /// Store the tokens of a freshly established session.
    fn adopt(&self, session: AuthSession) -> AuthSession {
        self.set_tokens(Some(session.tokens()));
        session
    }

    /// Ensure the response has a success status code, or decode its error
    /// envelope.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(decode_error(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<()> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx body into a [`ClientError`]. Bodies that are not the
/// server's envelope (proxies, panics) keep their raw text.
fn decode_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(envelope) => ClientError::from_status(status, envelope.code, envelope.error),
        Err(_) => ClientError::from_status(status, "UNKNOWN".to_string(), body.to_string()),
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn sign_in_anonymously(&self) -> ClientResult<AuthSession> {
        let response = self.client.post(self.url("/auth/anonymous")).send().await?;
        let session: AuthSession = Self::parse_response(response).await?;
        Ok(self.adopt(session))
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: AuthSession = Self::parse_response(response).await?;
        Ok(self.adopt(session))
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthSession> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let session: AuthSession = Self::parse_response(response).await?;
        Ok(self.adopt(session))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let response = self
            .authorized(self.client.post(self.url("/auth/logout")))
            .send()
            .await?;
        self.set_tokens(None);
        Self::check_status(response).await
    }
}

#[async_trait]
impl ProjectDirectory for ApiClient {
    async fn create_project(&self, input: &CreateProject) -> ClientResult<Project> {
        let response = self
            .authorized(self.client.post(self.url("/projects")))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let response = self
            .authorized(self.client.get(self.url("/projects")))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_project(&self, id: DbId) -> ClientResult<Project> {
        let response = self
            .authorized(self.client.get(self.url(&format!("/projects/{id}"))))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_project(&self, id: DbId, input: &UpdateProject) -> ClientResult<Project> {
        let response = self
            .authorized(self.client.put(self.url(&format!("/projects/{id}"))))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_project(&self, id: DbId) -> ClientResult<()> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("/projects/{id}"))))
            .send()
            .await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl TaskService for ApiClient {
    async fn create_tasks(
        &self,
        project_id: DbId,
        inputs: &[CreateTask],
    ) -> ClientResult<Vec<Task>> {
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/projects/{project_id}/tasks"))),
            )
            .json(inputs)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn list_tasks(&self, project_id: DbId) -> ClientResult<Vec<Task>> {
        let response = self
            .authorized(
                self.client
                    .get(self.url(&format!("/projects/{project_id}/tasks"))),
            )
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_task_status(&self, task_id: DbId, status: TaskStatus) -> ClientResult<Task> {
        let response = self
            .authorized(
                self.client
                    .patch(self.url(&format!("/tasks/{task_id}/status"))),
            )
            .json(&UpdateTaskStatus { status })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_task(&self, task_id: DbId, input: &UpdateTask) -> ClientResult<Task> {
        let response = self
            .authorized(self.client.put(self.url(&format!("/tasks/{task_id}"))))
            .json(input)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_task(&self, task_id: DbId) -> ClientResult<()> {
        let response = self
            .authorized(self.client.delete(self.url(&format!("/tasks/{task_id}"))))
            .send()
            .await?;
        Self::check_status(response).await
    }
}

#[async_trait]
impl TaskGeneration for ApiClient {
    async fn generate_project_tasks(
        &self,
        project_id: DbId,
        description: Option<&str>,
    ) -> ClientResult<GeneratedTasks> {
        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/projects/{project_id}/generate-tasks"))),
            )
            .json(&serde_json::json!({ "description": description }))
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
