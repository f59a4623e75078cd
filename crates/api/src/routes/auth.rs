//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /anonymous  -> anonymous
/// POST /register   -> register
/// POST /login      -> login
/// POST /refresh    -> refresh
/// POST /logout     -> logout (requires auth)
/// GET  /me         -> me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/anonymous", post(auth::anonymous))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
