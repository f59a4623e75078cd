//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;

use crate::auth::jwt::Role;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token.
///
/// Every project and task handler takes this; `user_id` scopes all queries.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Expected Authorization: Bearer <token>"))?;

        let claims = state
            .config
            .jwt
            .verify(token)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
