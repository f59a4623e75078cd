//! Local edit buffer for the task detail view.
//!
//! The editor never talks to the backend itself. [`BoardController`]
//! persists what [`TaskDetailEditor::validate`] yields, and deletion needs a
//! [`ConfirmedDelete`] that only [`TaskDetailEditor::confirm_delete`] hands
//! out after the user armed it.
//!
//! [`BoardController`]: crate::board::BoardController

use taskforge_core::task::{TaskPriority, TaskStatus};
use taskforge_core::types::DbId;
use taskforge_core::validation::{validate_estimated_hours, validate_task_title};
use taskforge_db::models::task::{Task, UpdateTask};

use crate::error::ClientResult;

/// Proof that the user confirmed deleting `task_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedDelete {
    task_id: DbId,
}

impl ConfirmedDelete {
    pub fn task_id(&self) -> DbId {
        self.task_id
    }
}

#[derive(Debug, Clone)]
pub struct TaskDetailEditor {
    original: Task,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Clearing hours is not expressible as a partial update; `None` keeps
    /// the stored value.
    pub estimated_hours: Option<f64>,
    delete_armed: bool,
}

impl TaskDetailEditor {
    pub fn open(task: &Task) -> Self {
        Self {
            original: task.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            estimated_hours: task.estimated_hours,
            delete_armed: false,
        }
    }

    pub fn task_id(&self) -> DbId {
        self.original.id
    }

    pub fn original(&self) -> &Task {
        &self.original
    }

    /// Fields that differ from the task as opened.
    pub fn changes(&self) -> UpdateTask {
        let original = &self.original;
        UpdateTask {
            title: (self.title != original.title).then(|| self.title.clone()),
            description: (self.description != original.description)
                .then(|| self.description.clone()),
            status: (self.status != original.status).then_some(self.status),
            priority: (self.priority != original.priority).then_some(self.priority),
            sort_order: None,
            estimated_hours: self
                .estimated_hours
                .filter(|hours| Some(*hours) != original.estimated_hours),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes().is_empty()
    }

    /// The changes to persist, with the title trimmed. Blocks saving an
    /// empty title or negative hours.
    pub fn validate(&self) -> ClientResult<UpdateTask> {
        let mut changes = self.changes();
        if let Some(title) = &changes.title {
            let title = validate_task_title(title)?;
            changes.title = (title != self.original.title).then_some(title);
        }
        validate_estimated_hours(changes.estimated_hours)?;
        Ok(changes)
    }

    /// Cancel: drop every unsaved edit.
    pub fn discard(&mut self) {
        *self = Self::open(&self.original);
    }

    /// First step of deletion. Nothing is deleted yet.
    pub fn request_delete(&mut self) {
        self.delete_armed = true;
    }

    pub fn cancel_delete(&mut self) {
        self.delete_armed = false;
    }

    pub fn delete_requested(&self) -> bool {
        self.delete_armed
    }

    /// Second step of deletion. `None` unless [`request_delete`] came first.
    ///
    /// [`request_delete`]: Self::request_delete
    pub fn confirm_delete(&mut self) -> Option<ConfirmedDelete> {
        std::mem::take(&mut self.delete_armed).then(|| ConfirmedDelete {
            task_id: self.original.id,
        })
    }
}
