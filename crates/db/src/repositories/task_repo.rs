//! Repository for the `tasks` table.
//!
//! Tasks carry no `user_id`; ownership is checked by joining through
//! `projects`. Callers listing a project's tasks verify the project first.

use sqlx::{PgConnection, PgPool};
use taskforge_core::task::TaskStatus;
use taskforge_core::types::DbId;

use crate::models::task::{CreateTask, Task, UpdateTask};

const COLUMNS: &str = "id, project_id, title, description, status, priority, sort_order, \
                       estimated_hours, created_at, updated_at";

/// [`COLUMNS`] qualified with the `t` alias for joined queries.
const T_COLUMNS: &str = "t.id, t.project_id, t.title, t.description, t.status, t.priority, \
                         t.sort_order, t.estimated_hours, t.created_at, t.updated_at";

/// Provides CRUD and ordering operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a batch of tasks for one project in its own transaction,
    /// returning the created rows in input order.
    pub async fn create_many(
        pool: &PgPool,
        project_id: DbId,
        inputs: &[CreateTask],
    ) -> Result<Vec<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = Self::insert_batch(&mut tx, project_id, inputs).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Insert a batch on an open connection, usually a transaction the
    /// caller commits together with related rows.
    ///
    /// `sort_order` continues from the project's current task count. The
    /// project row is locked until the transaction ends so two concurrent
    /// batches cannot read the same count.
    pub async fn insert_batch(
        conn: &mut PgConnection,
        project_id: DbId,
        inputs: &[CreateTask],
    ) -> Result<Vec<Task>, sqlx::Error> {
        sqlx::query("SELECT id FROM projects WHERE id = $1 FOR UPDATE")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&mut *conn)
            .await?;
        let base = i32::try_from(count).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let query = format!(
            "INSERT INTO tasks (project_id, title, description, status, priority, sort_order, estimated_hours)
             VALUES ($1, $2, $3, COALESCE($4, 'todo'), COALESCE($5, 'medium'), $6, $7)
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(inputs.len());
        for (offset, input) in (0i32..).zip(inputs) {
            let task = sqlx::query_as::<_, Task>(&query)
                .bind(project_id)
                .bind(&input.title)
                .bind(&input.description)
                .bind(input.status.map(|s| s.as_str()))
                .bind(input.priority.map(|p| p.as_str()))
                .bind(base + offset)
                .bind(input.estimated_hours)
                .fetch_one(&mut *conn)
                .await?;
            created.push(task);
        }

        tracing::debug!(project_id, count = created.len(), base, "Inserted task batch");
        Ok(created)
    }

    /// Number of tasks in a project.
    pub async fn count_for_project(pool: &PgPool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// List a project's tasks ordered by `sort_order` ascending.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Find a task by ID if its project belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS} FROM tasks t
             JOIN projects p ON p.id = t.project_id
             WHERE t.id = $1 AND p.user_id = $2"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a task. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no task with `id` exists under one of the user's projects.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks t SET
                title = COALESCE($3, t.title),
                description = COALESCE($4, t.description),
                status = COALESCE($5, t.status),
                priority = COALESCE($6, t.priority),
                sort_order = COALESCE($7, t.sort_order),
                estimated_hours = COALESCE($8, t.estimated_hours)
             FROM projects p
             WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2
             RETURNING {T_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.sort_order)
            .bind(input.estimated_hours)
            .fetch_optional(pool)
            .await
    }

    /// Set only the status of a task (drag-and-drop path).
    pub async fn update_status(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        status: TaskStatus,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks t SET status = $3
             FROM projects p
             WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2
             RETURNING {T_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Delete a task. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM tasks t USING projects p
             WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
