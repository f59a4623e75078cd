//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use taskforge_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_anonymous: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: Option<String>,
    pub is_anonymous: bool,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_anonymous: user.is_anonymous,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. Anonymous users carry no credentials.
#[derive(Debug)]
pub struct CreateUser {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_anonymous: bool,
}
