//! Refresh-token sessions.

use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};

/// One issued refresh token. Revoked when used or at sign-out.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload; the token itself is never stored, only its digest.
pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
