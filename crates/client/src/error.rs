use taskforge_core::error::CoreError;

/// Errors surfaced to client views.
///
/// Mirrors the server's error taxonomy: every non-2xx response is decoded
/// from its `{"error", "code"}` envelope into one of these variants.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No valid session. The caller signs in again.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// The server refused the action outright, e.g. anonymous sign-in
    /// when the deployment disables it. Retrying does not help.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The record is missing or belongs to someone else.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected at the form boundary or by the server's validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The server answered with any other error.
    #[error("Backend error ({status} {code}): {message}")]
    Backend {
        status: u16,
        code: String,
        message: String,
    },

    /// The request never got a response (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Persisted token storage could not be read or written.
    #[error("Token storage error: {0}")]
    Storage(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Map a status code and error envelope to a variant.
    pub fn from_status(status: u16, code: String, message: String) -> Self {
        match (status, code.as_str()) {
            (401, _) => ClientError::AuthRequired(message),
            (403, _) => ClientError::Forbidden(message),
            (404, _) => ClientError::NotFound(message),
            (400, "VALIDATION_ERROR") | (422, _) => ClientError::Validation(message),
            _ => ClientError::Backend {
                status,
                code,
                message,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, ClientError::AuthRequired(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, ClientError::Forbidden(_))
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ClientError::Validation(msg),
            CoreError::NotFound { entity, id } => {
                ClientError::NotFound(format!("{entity} with id {id} not found"))
            }
            CoreError::Unauthorized(msg) => ClientError::AuthRequired(msg),
            CoreError::Forbidden(msg) => ClientError::Forbidden(msg),
            other => ClientError::Backend {
                status: 0,
                code: "CLIENT".into(),
                message: other.to_string(),
            },
        }
    }
}
