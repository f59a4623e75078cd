//! Refresh-token sessions in `user_sessions`.

use sqlx::PgPool;
use taskforge_core::types::DbId;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str =
    "id, user_id, refresh_token_hash, expires_at, is_revoked, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Revoke the live session holding `hash` and return it.
    ///
    /// A refresh token is single use: of two concurrent calls with the same
    /// hash, only one gets `Some`. Expired or already revoked sessions yield
    /// `None`.
    pub async fn consume(pool: &PgPool, hash: &str) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live session of `user_id`, returning how many there were.
    pub async fn revoke_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        sqlx::query("UPDATE user_sessions SET is_revoked = true WHERE user_id = $1 AND NOT is_revoked")
            .bind(user_id)
            .execute(pool)
            .await
            .map(|done| done.rows_affected())
    }
}
