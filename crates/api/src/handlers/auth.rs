//! Handlers for the `/auth` resource.
//!
//! Guests get an account through `POST /auth/anonymous`; registered users
//! sign in with email + password. Both receive the same token pair.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskforge_core::error::CoreError;
use taskforge_core::validation::{validate_email, validate_password};
use taskforge_db::models::session::CreateSession;
use taskforge_db::models::user::{CreateUser, User, UserResponse};
use taskforge_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{digest, RefreshToken, Role};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by every sign-in path.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/anonymous
///
/// Create a guest account and sign it in. Refused when anonymous sign-in is
/// disabled by configuration.
pub async fn anonymous(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if !state.config.allow_anonymous {
        return Err(AppError::Core(CoreError::Forbidden(
            "Anonymous sign-in is disabled".into(),
        )));
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: None,
            password_hash: None,
            is_anonymous: true,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "Created anonymous user");

    let response = create_auth_response(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = validate_email(&input.email)?;
    validate_password(&input.password)?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: Some(email),
            password_hash: Some(password_hash),
            is_anonymous: false,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "Registered user");

    let response = create_auth_response(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = input.email.trim().to_lowercase();

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(stored_hash) = user.password_hash.as_deref() else {
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new pair. Each refresh token works once.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = SessionRepo::consume(&state.pool, &digest(&input.refresh_token))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "Signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Mint a token pair for `user`, record the session, and build the response.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = jwt
        .issue(user.id, Role::of(user.is_anonymous))
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = RefreshToken::generate();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at: Utc::now() + chrono::Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: jwt.access_ttl_secs(),
        user: user.into(),
    })
}
