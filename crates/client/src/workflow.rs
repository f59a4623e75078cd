//! Multi-step project flows that span several services.

use taskforge_core::generation::GenerationSource;
use taskforge_core::types::DbId;
use taskforge_core::validation::{validate_generation_description, validate_project_name};
use taskforge_db::models::project::{CreateProject, Project, UpdateProject};
use taskforge_db::models::task::Task;

use crate::error::ClientResult;
use crate::notice::NoticeBus;
use crate::services::{ProjectDirectory, TaskGeneration};
use crate::store::ProjectStore;

/// The project creation form as typed.
#[derive(Debug, Clone, Default)]
pub struct CreateProjectForm {
    pub name: String,
    pub description: String,
}

impl CreateProjectForm {
    /// Both fields are required once trimmed; the description seeds task
    /// generation.
    pub fn validate(&self) -> ClientResult<CreateProject> {
        let name = validate_project_name(&self.name)?;
        let description = validate_generation_description(&self.description)?;
        Ok(CreateProject {
            name,
            description: Some(description),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub project: Project,
    pub tasks: Vec<Task>,
    /// `None` when generation could not be reached at all.
    pub source: Option<GenerationSource>,
}

/// Create a project, generate its first tasks and select it.
///
/// Invalid input is rejected before any request. Once the project exists it
/// is selected even if generation fails; that failure becomes a notice.
pub async fn create_project_with_ai(
    directory: &dyn ProjectDirectory,
    generation: &dyn TaskGeneration,
    store: &ProjectStore,
    notices: &NoticeBus,
    form: &CreateProjectForm,
) -> ClientResult<CreatedProject> {
    let input = form.validate()?;

    let project = match directory.create_project(&input).await {
        Ok(project) => project,
        Err(e) => {
            tracing::warn!(error = %e, "Project creation failed");
            notices.error("Error", "Failed to create project");
            return Err(e);
        }
    };
    store.select(project.clone());

    match generation
        .generate_project_tasks(project.id, input.description.as_deref())
        .await
    {
        Ok(generated) => {
            tracing::info!(
                project_id = project.id,
                count = generated.tasks.len(),
                source = generated.source.as_str(),
                "Created project with generated tasks"
            );
            notices.success(
                "Tasks generated!",
                format!("Created {} new tasks for your project", generated.tasks.len()),
            );
            Ok(CreatedProject {
                project,
                tasks: generated.tasks,
                source: Some(generated.source),
            })
        }
        Err(e) => {
            tracing::warn!(project_id = project.id, error = %e, "Task generation request failed");
            notices.error("Error", "Project created, but tasks could not be generated");
            Ok(CreatedProject {
                project,
                tasks: Vec::new(),
                source: None,
            })
        }
    }
}

/// Rename or re-describe a project, keeping the selection in sync.
pub async fn update_project(
    directory: &dyn ProjectDirectory,
    store: &ProjectStore,
    notices: &NoticeBus,
    id: DbId,
    input: &UpdateProject,
) -> ClientResult<Project> {
    let input = UpdateProject {
        name: input.name.as_deref().map(validate_project_name).transpose()?,
        description: input.description.clone(),
    };
    match directory.update_project(id, &input).await {
        Ok(project) => {
            store.refresh_with(&project);
            notices.success("Success", "Project updated");
            Ok(project)
        }
        Err(e) => {
            if e.is_not_found() {
                store.forget(id);
            }
            notices.error("Error", "Failed to update project");
            Err(e)
        }
    }
}

/// Delete a project and drop it from the selection.
///
/// A project that is already gone counts as deleted.
pub async fn delete_project(
    directory: &dyn ProjectDirectory,
    store: &ProjectStore,
    notices: &NoticeBus,
    id: DbId,
) -> ClientResult<()> {
    match directory.delete_project(id).await {
        Ok(()) => {
            store.forget(id);
            notices.success("Success", "Project deleted");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            store.forget(id);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(project_id = id, error = %e, "Project delete failed");
            notices.error("Error", "Failed to delete project");
            Err(e)
        }
    }
}
