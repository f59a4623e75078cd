#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use taskforge_client::error::{ClientError, ClientResult};
use taskforge_client::notice::Notice;
use taskforge_client::services::{
    AuthBackend, AuthSession, GeneratedTasks, ProjectDirectory, StoredTokens, TaskGeneration,
    TaskService,
};
use taskforge_core::generation::{fallback_drafts, GenerationSource};
use taskforge_core::task::{TaskPriority, TaskStatus};
use taskforge_core::types::{DbId, Timestamp};
use taskforge_db::models::project::{CreateProject, Project, UpdateProject};
use taskforge_db::models::task::{CreateTask, Task, UpdateTask};
use taskforge_db::models::user::UserResponse;
use tokio::sync::broadcast;

pub const EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Operations whose failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListProjects,
    GetProject,
    CreateProject,
    DeleteProject,
    ListTasks,
    ListTasksFor(DbId),
    UpdateStatus,
    UpdateTask,
    DeleteTask,
    Generate,
    Refresh,
    SignInAnonymously,
    SignOut,
}

/// What an injected failure looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Backend,
    NotFound,
    AuthRequired,
    Forbidden,
}

impl Failure {
    fn into_error(self) -> ClientError {
        match self {
            Failure::Backend => ClientError::Backend {
                status: 500,
                code: "INTERNAL_ERROR".into(),
                message: "An internal error occurred".into(),
            },
            Failure::NotFound => ClientError::NotFound("not found".into()),
            Failure::AuthRequired => ClientError::AuthRequired("Invalid or expired token".into()),
            Failure::Forbidden => ClientError::Forbidden("Anonymous sign-in is disabled".into()),
        }
    }
}

#[derive(Default)]
struct State {
    next_id: DbId,
    next_user_id: DbId,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    refresh_tokens: HashSet<String>,
    conversations: usize,
}

impl State {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for the HTTP API, with the same ordering and
/// cascade rules as the server.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    failures: Mutex<HashMap<Op, Failure>>,
    next_failures: Mutex<HashMap<Op, Failure>>,
    list_tasks_calls: AtomicUsize,
    anonymous_sign_ins: AtomicUsize,
}

fn at(seconds: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

fn user(id: DbId, anonymous: bool) -> UserResponse {
    UserResponse {
        id,
        email: (!anonymous).then(|| EMAIL.to_string()),
        is_anonymous: anonymous,
        created_at: at(0),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.failures.lock().unwrap().insert(op, failure);
    }

    /// Fail only the next call of `op`, like an access token that just expired.
    pub fn fail_once(&self, op: Op, failure: Failure) {
        self.next_failures.lock().unwrap().insert(op, failure);
    }

    pub fn heal(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    pub fn list_tasks_calls(&self) -> usize {
        self.list_tasks_calls.load(Ordering::SeqCst)
    }

    pub fn anonymous_sign_ins(&self) -> usize {
        self.anonymous_sign_ins.load(Ordering::SeqCst)
    }

    pub fn project_count(&self) -> usize {
        self.state.lock().unwrap().projects.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.state.lock().unwrap().conversations
    }

    /// Server-side copy of a task, bypassing failure injection.
    pub fn stored_task(&self, task_id: DbId) -> Option<Task> {
        let state = self.state.lock().unwrap();
        state.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    /// Issue a refresh token the backend will accept.
    pub fn issue_refresh_token(&self) -> StoredTokens {
        let mut state = self.state.lock().unwrap();
        let token = format!("refresh-{}", state.id());
        state.refresh_tokens.insert(token.clone());
        StoredTokens {
            access_token: format!("access-{token}"),
            refresh_token: token,
        }
    }

    /// Seed a project with tasks in the given lanes.
    pub fn seed(&self, name: &str, lanes: &[TaskStatus]) -> (Project, Vec<Task>) {
        let mut state = self.state.lock().unwrap();
        let project = new_project(&mut state, name, None);
        let tasks: Vec<Task> = lanes
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let id = state.id();
                Task {
                    id,
                    project_id: project.id,
                    title: format!("Task {}", i + 1),
                    description: String::new(),
                    status: *status,
                    priority: TaskPriority::Medium,
                    sort_order: i as i32,
                    estimated_hours: Some(1.5),
                    created_at: at(id),
                    updated_at: at(id),
                }
            })
            .collect();
        state.tasks.extend(tasks.iter().cloned());
        (project, tasks)
    }

    fn check(&self, op: Op) -> ClientResult<()> {
        if let Some(failure) = self.next_failures.lock().unwrap().remove(&op) {
            return Err(failure.into_error());
        }
        match self.failures.lock().unwrap().get(&op) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn session(&self, user: UserResponse) -> AuthSession {
        let tokens = self.issue_refresh_token();
        AuthSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: 900,
            user,
        }
    }
}

fn new_project(state: &mut State, name: &str, description: Option<String>) -> Project {
    let id = state.id();
    let project = Project {
        id,
        user_id: 1,
        name: name.to_string(),
        description,
        created_at: at(id),
        updated_at: at(id),
    };
    state.projects.push(project.clone());
    project
}

fn create_tasks(state: &mut State, project_id: DbId, inputs: &[CreateTask]) -> Vec<Task> {
    let base = state.tasks.iter().filter(|t| t.project_id == project_id).count();
    let created: Vec<Task> = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let id = state.id();
            Task {
                id,
                project_id,
                title: input.title.clone(),
                description: input.description.clone(),
                status: input.status.unwrap_or(TaskStatus::Todo),
                priority: input.priority.unwrap_or(TaskPriority::Medium),
                sort_order: (base + i) as i32,
                estimated_hours: input.estimated_hours,
                created_at: at(id),
                updated_at: at(id),
            }
        })
        .collect();
    state.tasks.extend(created.iter().cloned());
    created
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn sign_in_anonymously(&self) -> ClientResult<AuthSession> {
        self.check(Op::SignInAnonymously)?;
        self.anonymous_sign_ins.fetch_add(1, Ordering::SeqCst);
        let id = {
            let mut state = self.state.lock().unwrap();
            state.next_user_id += 1;
            state.next_user_id
        };
        Ok(self.session(user(id, true)))
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        if email != EMAIL || password != PASSWORD {
            return Err(ClientError::AuthRequired("Invalid email or password".into()));
        }
        Ok(self.session(user(100, false)))
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<AuthSession> {
        self.check(Op::Refresh)?;
        let known = self.state.lock().unwrap().refresh_tokens.remove(refresh_token);
        if !known {
            return Err(ClientError::AuthRequired("Invalid or expired refresh token".into()));
        }
        Ok(self.session(user(100, false)))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        self.check(Op::SignOut)?;
        self.state.lock().unwrap().refresh_tokens.clear();
        Ok(())
    }
}

#[async_trait]
impl ProjectDirectory for FakeBackend {
    async fn create_project(&self, input: &CreateProject) -> ClientResult<Project> {
        self.check(Op::CreateProject)?;
        let mut state = self.state.lock().unwrap();
        Ok(new_project(&mut state, &input.name, input.description.clone()))
    }

    async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        self.check(Op::ListProjects)?;
        let mut projects = self.state.lock().unwrap().projects.clone();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, id: DbId) -> ClientResult<Project> {
        self.check(Op::GetProject)?;
        let state = self.state.lock().unwrap();
        state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Project with id {id} not found")))
    }

    async fn update_project(&self, id: DbId, input: &UpdateProject) -> ClientResult<Project> {
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Project with id {id} not found")))?;
        if let Some(name) = &input.name {
            project.name = name.clone();
        }
        if let Some(description) = &input.description {
            project.description = Some(description.clone());
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, id: DbId) -> ClientResult<()> {
        self.check(Op::DeleteProject)?;
        let mut state = self.state.lock().unwrap();
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Err(ClientError::NotFound(format!("Project with id {id} not found")));
        }
        state.tasks.retain(|t| t.project_id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskService for FakeBackend {
    async fn create_tasks(
        &self,
        project_id: DbId,
        inputs: &[CreateTask],
    ) -> ClientResult<Vec<Task>> {
        let mut state = self.state.lock().unwrap();
        if !state.projects.iter().any(|p| p.id == project_id) {
            return Err(ClientError::NotFound(format!("Project with id {project_id} not found")));
        }
        Ok(create_tasks(&mut state, project_id, inputs))
    }

    async fn list_tasks(&self, project_id: DbId) -> ClientResult<Vec<Task>> {
        self.list_tasks_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Op::ListTasks)?;
        self.check(Op::ListTasksFor(project_id))?;
        let state = self.state.lock().unwrap();
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.sort_order);
        Ok(tasks)
    }

    async fn update_task_status(&self, task_id: DbId, status: TaskStatus) -> ClientResult<Task> {
        self.check(Op::UpdateStatus)?;
        self.update_task(
            task_id,
            &UpdateTask {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    async fn update_task(&self, task_id: DbId, input: &UpdateTask) -> ClientResult<Task> {
        self.check(Op::UpdateTask)?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ClientError::NotFound(format!("Task with id {task_id} not found")))?;
        task.apply(input);
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: DbId) -> ClientResult<()> {
        self.check(Op::DeleteTask)?;
        let mut state = self.state.lock().unwrap();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != task_id);
        if state.tasks.len() == before {
            return Err(ClientError::NotFound(format!("Task with id {task_id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskGeneration for FakeBackend {
    async fn generate_project_tasks(
        &self,
        project_id: DbId,
        description: Option<&str>,
    ) -> ClientResult<GeneratedTasks> {
        self.check(Op::Generate)?;
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Project with id {project_id} not found")))?;
        let description = description
            .map(str::to_string)
            .or(project.description)
            .ok_or_else(|| ClientError::Validation("Project description is required".into()))?;

        let inputs: Vec<CreateTask> = fallback_drafts(&description)
            .into_iter()
            .map(CreateTask::from)
            .collect();
        let tasks = create_tasks(&mut state, project_id, &inputs);
        state.conversations += 1;
        Ok(GeneratedTasks {
            tasks,
            source: GenerationSource::Fallback,
            conversation_id: state.conversations as DbId,
        })
    }
}

/// Everything published so far.
pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
