//! Kanban board for one project.
//!
//! [`BoardController`] owns the project's task list and drives it with
//! optimistic updates: the local list changes as soon as the request is
//! issued, and a failed request is reconciled by reverting and reloading
//! from the backend. Failures surface as notices and never leave the board
//! unusable.

use std::sync::Arc;

use taskforge_core::kanban::{group_by_lane, lane_counts, BoardLanes, DragState, LaneCounts};
use taskforge_core::task::TaskStatus;
use taskforge_core::types::DbId;
use taskforge_db::models::task::Task;

use crate::editor::{ConfirmedDelete, TaskDetailEditor};
use crate::error::ClientResult;
use crate::notice::NoticeBus;
use crate::services::TaskService;

pub struct BoardController {
    service: Arc<dyn TaskService>,
    notices: NoticeBus,
    project_id: DbId,
    tasks: Vec<Task>,
    drag: DragState,
}

impl BoardController {
    /// An empty board. Call [`load`](Self::load) to fetch tasks.
    pub fn new(service: Arc<dyn TaskService>, notices: NoticeBus, project_id: DbId) -> Self {
        Self {
            service,
            notices,
            project_id,
            tasks: Vec::new(),
            drag: DragState::default(),
        }
    }

    pub fn project_id(&self) -> DbId {
        self.project_id
    }

    /// Tasks ascending by `order`.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: DbId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn lanes(&self) -> BoardLanes<'_, Task> {
        group_by_lane(&self.tasks)
    }

    pub fn counts(&self) -> LaneCounts {
        lane_counts(&self.tasks)
    }

    /// Fetch the task list. On failure the board shows no tasks.
    pub async fn load(&mut self) -> ClientResult<()> {
        match self.service.list_tasks(self.project_id).await {
            Ok(tasks) => {
                tracing::debug!(project_id = self.project_id, count = tasks.len(), "Loaded tasks");
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(project_id = self.project_id, error = %e, "Failed to load tasks");
                self.tasks.clear();
                self.notices
                    .error("Error", "Failed to load tasks for this project.");
                Err(e)
            }
        }
    }

    // ---- drag and drop ----

    pub fn drag_start(&mut self, task_id: DbId) {
        self.drag.start(task_id);
    }

    pub fn drag_over(&self, lane: TaskStatus) -> bool {
        self.drag.drag_over(lane)
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn dragging(&self) -> Option<DbId> {
        self.drag.dragging()
    }

    /// Drop the dragged card on `lane` and persist the move.
    ///
    /// Returns `Ok(None)` when nothing was being dragged, the card is no
    /// longer on the board, or it was dropped on its own lane.
    pub async fn drop_on(&mut self, lane: TaskStatus) -> ClientResult<Option<Task>> {
        let Some(task_move) = self.drag.drop_on(lane) else {
            return Ok(None);
        };
        let Some(index) = self.position(task_move.task_id) else {
            return Ok(None);
        };
        let previous = self.tasks[index].status;
        if previous == task_move.to {
            return Ok(None);
        }

        self.tasks[index].status = task_move.to;
        match self
            .service
            .update_task_status(task_move.task_id, task_move.to)
            .await
        {
            Ok(updated) => {
                self.replace(updated.clone());
                Ok(Some(updated))
            }
            Err(e) => {
                tracing::warn!(
                    task_id = task_move.task_id,
                    from = %previous,
                    to = %task_move.to,
                    error = %e,
                    "Reverting task move"
                );
                if let Some(index) = self.position(task_move.task_id) {
                    self.tasks[index].status = previous;
                }
                self.notices.error("Error", "Failed to update task status");
                self.reconcile().await;
                Err(e)
            }
        }
    }

    /// Open the detail editor for a card, unless a drag is in flight.
    pub fn click(&self, task_id: DbId) -> Option<TaskDetailEditor> {
        let task_id = self.drag.click(task_id)?;
        self.task(task_id).map(TaskDetailEditor::open)
    }

    // ---- detail editor ----

    /// Persist the editor's changes, applying them locally first.
    ///
    /// On success the editor is reopened on the saved task. Validation
    /// failures return before any request is made.
    pub async fn save(&mut self, editor: &mut TaskDetailEditor) -> ClientResult<Task> {
        let changes = editor.validate()?;
        let task_id = editor.task_id();
        if changes.is_empty() {
            return Ok(editor.original().clone());
        }

        let snapshot = self.task(task_id).cloned();
        if let Some(index) = self.position(task_id) {
            self.tasks[index].apply(&changes);
        }

        match self.service.update_task(task_id, &changes).await {
            Ok(updated) => {
                self.replace(updated.clone());
                *editor = TaskDetailEditor::open(&updated);
                self.notices.success("Success", "Task updated successfully");
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(task_id, error = %e, "Task update failed, reloading board");
                if let Some(snapshot) = snapshot {
                    self.replace(snapshot);
                }
                self.notices.error("Error", "Failed to update task");
                self.reconcile().await;
                Err(e)
            }
        }
    }

    /// Delete a task the user confirmed. On failure the task stays.
    pub async fn delete(&mut self, confirmed: ConfirmedDelete) -> ClientResult<()> {
        let task_id = confirmed.task_id();
        match self.service.delete_task(task_id).await {
            Ok(()) => {
                self.tasks.retain(|task| task.id != task_id);
                self.notices.success("Success", "Task deleted successfully");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(task_id, error = %e, "Task delete failed");
                self.notices.error("Error", "Failed to delete task");
                Err(e)
            }
        }
    }

    // ---- private helpers ----

    fn position(&self, task_id: DbId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == task_id)
    }

    fn replace(&mut self, task: Task) {
        if let Some(index) = self.position(task.id) {
            self.tasks[index] = task;
        }
    }

    /// Re-fetch after a failed write. A failed re-fetch keeps the reverted
    /// local list rather than blanking the board.
    async fn reconcile(&mut self) {
        match self.service.list_tasks(self.project_id).await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => {
                tracing::warn!(
                    project_id = self.project_id,
                    error = %e,
                    "Reload after failed write also failed"
                );
            }
        }
    }
}

impl std::fmt::Debug for BoardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardController")
            .field("project_id", &self.project_id)
            .field("tasks", &self.tasks.len())
            .field("drag", &self.drag)
            .finish()
    }
}

