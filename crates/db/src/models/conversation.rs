//! Generation conversation model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::generation::GenerationSource;
use taskforge_core::types::{DbId, Timestamp};

/// A row from the `conversations` table: one generation request and reply.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Conversation {
    pub id: DbId,
    pub project_id: DbId,
    pub user_message: String,
    pub ai_response: String,
    #[sqlx(try_from = "String")]
    pub source: GenerationSource,
    pub created_at: Timestamp,
}

/// DTO for recording a conversation.
#[derive(Debug, Clone)]
pub struct CreateConversation {
    pub project_id: DbId,
    pub user_message: String,
    pub ai_response: String,
    pub source: GenerationSource,
}
