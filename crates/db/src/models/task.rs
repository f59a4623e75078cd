//! Task entity model and DTOs.
//!
//! `status` and `priority` are `TEXT` columns decoded into the closed
//! enumerations from `taskforge_core::task`. The `sort_order` column is
//! exposed as `order` on the wire.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::generation::TaskDraft;
use taskforge_core::kanban::LaneItem;
use taskforge_core::task::{TaskPriority, TaskStatus};
use taskforge_core::types::{DbId, Timestamp};

/// A task row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub estimated_hours: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Apply a partial update locally, as the server would.
    pub fn apply(&mut self, update: &UpdateTask) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(order) = update.sort_order {
            self.sort_order = order;
        }
        if let Some(hours) = update.estimated_hours {
            self.estimated_hours = Some(hours);
        }
    }
}

impl LaneItem for Task {
    fn item_id(&self) -> DbId {
        self.id
    }

    fn lane(&self) -> TaskStatus {
        self.status
    }
}

/// DTO for one element of a bulk insert. `order` is assigned server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to `todo` if omitted.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Defaults to `medium` if omitted.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

impl From<TaskDraft> for CreateTask {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            status: Some(TaskStatus::Todo),
            priority: Some(draft.priority),
            estimated_hours: draft.estimated_hours,
        }
    }
}

/// DTO for updating an existing task. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "order", default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}
