//! Project grid: every project with its per-lane task counts.

use futures::future::join_all;
use taskforge_core::kanban::{lane_counts, LaneCounts};
use taskforge_db::models::project::Project;

use crate::error::ClientResult;
use crate::notice::NoticeBus;
use crate::services::{ProjectDirectory, TaskService};

/// One card on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub project: Project,
    pub counts: LaneCounts,
    /// The task fetch failed and `counts` are zero placeholders.
    pub load_failed: bool,
}

impl ProjectSummary {
    pub fn completed(&self) -> usize {
        self.counts.done
    }

    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Share of tasks done, rounded down. Zero for an empty project.
    pub fn progress_percent(&self) -> u8 {
        match self.total() {
            0 => 0,
            total => (self.completed() * 100 / total) as u8,
        }
    }
}

/// List projects newest first and fetch each one's tasks concurrently.
///
/// A failed task fetch degrades that project to zero counts; a failed
/// project listing yields an empty dashboard. Either way one notice is
/// published and the dashboard still renders. An expired session is the
/// exception: [`AuthRequired`](crate::error::ClientError::AuthRequired) is returned so the caller can
/// send the user to sign in.
pub async fn load_dashboard(
    directory: &dyn ProjectDirectory,
    tasks: &dyn TaskService,
    notices: &NoticeBus,
) -> ClientResult<Vec<ProjectSummary>> {
    let projects = match directory.list_projects().await {
        Ok(projects) => projects,
        Err(e) if e.is_auth_required() => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list projects");
            notices.error("Error", "Failed to load projects");
            return Ok(Vec::new());
        }
    };

    let fetches = projects.iter().map(|project| tasks.list_tasks(project.id));
    let results = join_all(fetches).await;

    let mut summaries = Vec::with_capacity(projects.len());
    let mut failed = 0usize;
    for (project, result) in projects.into_iter().zip(results) {
        let summary = match result {
            Ok(list) => ProjectSummary {
                project,
                counts: lane_counts(&list),
                load_failed: false,
            },
            Err(e) if e.is_auth_required() => return Err(e),
            Err(e) => {
                tracing::warn!(project_id = project.id, error = %e, "Failed to load project tasks");
                failed += 1;
                ProjectSummary {
                    project,
                    counts: LaneCounts::default(),
                    load_failed: true,
                }
            }
        };
        summaries.push(summary);
    }

    if failed > 0 {
        notices.error(
            "Error",
            format!("Could not load tasks for {failed} of {} projects", summaries.len()),
        );
    }

    Ok(summaries)
}
