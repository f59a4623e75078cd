/// Errors from a single generation attempt. Absorbed by
/// [`TaskGenerator`](crate::TaskGenerator); never surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The model endpoint returned a non-2xx status code.
    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The endpoint answered but carried no text.
    #[error("Model returned no text")]
    EmptyResponse,

    /// The reply text could not be turned into drafts.
    #[error("Could not parse model reply: {0}")]
    Parse(#[from] taskforge_core::generation::DraftParseError),
}
