use async_trait::async_trait;

use crate::error::GenerationError;

/// A text-completion model invoked once per generation request.
///
/// Implementations make exactly one attempt; retry policy, if any, belongs
/// to the caller.
#[async_trait]
pub trait TaskModel: Send + Sync {
    /// Send `prompt` and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Short identifier for logs, e.g. the model name.
    fn name(&self) -> &str;
}
