use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;

/// Errors a handler can return. Rendered as `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full, returned to the caller as a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// 404 for a row that does not exist or belongs to someone else.
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        AppError::Core(CoreError::NotFound { entity, id })
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => database_parts(&err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg)),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        };
        (status, Json(body)).into_response()
    }
}

fn core_parts(err: CoreError) -> (StatusCode, ErrorBody) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} with id {id} not found")),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("VALIDATION_ERROR", msg)),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg)),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorBody::new("UNAUTHORIZED", msg)),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::new("FORBIDDEN", msg)),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

/// Postgres SQLSTATE for a unique violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for a failed CHECK constraint.
const CHECK_VIOLATION: &str = "23514";

/// `RowNotFound` is a 404, named unique constraints (`uq_*`) a 409, and
/// CHECK failures a 400. Anything else is logged and hidden behind a 500.
fn database_parts(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    if let sqlx::Error::RowNotFound = err {
        return (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", "Resource not found"));
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorBody::new("CONFLICT", format!("Duplicate value for {constraint}")),
                );
            }
            Some(CHECK_VIOLATION) => {
                return (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("VALIDATION_ERROR", format!("Value violates {constraint}")),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
}
