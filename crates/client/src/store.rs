//! The selected-project cell shared by every view.
//!
//! [`ProjectStore`] is a cloneable handle over a `tokio::sync::watch`
//! channel: writes replace the value atomically and every subscriber sees
//! the latest one. Views hold a handle, never a copy of the project.

use std::sync::Arc;

use taskforge_core::types::DbId;
use taskforge_db::models::project::Project;
use tokio::sync::watch;

use crate::error::ClientResult;
use crate::services::ProjectDirectory;

#[derive(Clone)]
pub struct ProjectStore {
    sender: Arc<watch::Sender<Option<Project>>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current selection.
    pub fn get(&self) -> Option<Project> {
        self.sender.borrow().clone()
    }

    pub fn selected_id(&self) -> Option<DbId> {
        self.sender.borrow().as_ref().map(|project| project.id)
    }

    pub fn select(&self, project: Project) {
        tracing::debug!(project_id = project.id, "Selected project");
        self.sender.send_replace(Some(project));
    }

    /// Takes effect before returning, so callers may navigate right after.
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Project>> {
        self.sender.subscribe()
    }

    /// Fetch `id` and select it. A project that no longer exists clears
    /// the selection instead of leaving a dangling reference.
    pub async fn select_verified(
        &self,
        directory: &dyn ProjectDirectory,
        id: DbId,
    ) -> ClientResult<Project> {
        match directory.get_project(id).await {
            Ok(project) => {
                self.select(project.clone());
                Ok(project)
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::warn!(project_id = id, "Selected project no longer exists");
                    self.clear();
                }
                Err(err)
            }
        }
    }

    /// Drop the selection if it points at `id`. Returns whether it did.
    pub fn forget(&self, id: DbId) -> bool {
        self.sender.send_if_modified(|current| {
            if current.as_ref().is_some_and(|project| project.id == id) {
                *current = None;
                true
            } else {
                false
            }
        })
    }

    /// Replace the selection with a fresher copy of the same project.
    pub fn refresh_with(&self, project: &Project) {
        self.sender.send_if_modified(|current| match current {
            Some(selected) if selected.id == project.id => {
                *selected = project.clone();
                true
            }
            _ => false,
        });
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}
