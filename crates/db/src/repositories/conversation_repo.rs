//! Repository for the `conversations` table.

use sqlx::{PgExecutor, PgPool};
use taskforge_core::types::DbId;

use crate::models::conversation::{Conversation, CreateConversation};

const COLUMNS: &str = "id, project_id, user_message, ai_response, source, created_at";

/// Records task-generation exchanges per project.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Insert a conversation, returning the created row. Accepts the pool
    /// or an open transaction.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateConversation,
    ) -> Result<Conversation, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO conversations (project_id, user_message, ai_response, source)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(input.project_id)
            .bind(&input.user_message)
            .bind(&input.ai_response)
            .bind(input.source.as_str())
            .fetch_one(executor)
            .await
    }

    /// List a project's conversations, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
