//! Repository for the `projects` table.
//!
//! All lookups take the requesting `user_id`; rows owned by someone else
//! behave exactly like missing rows.

use sqlx::PgPool;
use taskforge_core::types::DbId;

use crate::models::project::{CreateProject, Project, UpdateProject};

const COLUMNS: &str = "id, user_id, name, description, created_at, updated_at";

/// Projects, always scoped to the owning user.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (user_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find one of the user's projects by ID.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the user's projects, most recently created first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied; an
    /// empty description sets the column to NULL.
    ///
    /// Returns `None` if the user owns no project with the given `id`.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                description = CASE WHEN $4::text IS NULL THEN description ELSE NULLIF($4, '') END
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a project. Its tasks and conversations go with it
    /// through `ON DELETE CASCADE`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
