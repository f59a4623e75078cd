/// Default Gemini model used for task generation.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Task generation configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key. `None` disables the model and every request uses the fallback list.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GenerationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                                      |
    /// |-----------------------|----------------------------------------------|
    /// | `GEMINI_API_KEY`      | unset (fallback only)                        |
    /// | `GEMINI_MODEL`        | `gemini-2.0-flash-exp`                       |
    /// | `GEMINI_BASE_URL`     | `https://generativelanguage.googleapis.com`  |
    /// | `GEMINI_TIMEOUT_SECS` | `30`                                         |
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = std::env::var("GEMINI_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("GEMINI_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            model,
            base_url,
            timeout_secs,
        }
    }
}
