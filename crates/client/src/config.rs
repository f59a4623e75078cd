use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::session::{
    FileTokenStore, MemoryTokenStore, SessionBootstrapper, SessionPolicy, TokenStore,
};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the API prefix, without a trailing slash.
    pub base_url: String,
    /// What to do when no stored session can be refreshed.
    pub session_policy: SessionPolicy,
    /// Where to persist tokens between runs. `None` keeps them in memory.
    pub token_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                    | Default                          |
    /// |----------------------------|----------------------------------|
    /// | `TASKFORGE_API_URL`        | `http://localhost:3000/api/v1`   |
    /// | `TASKFORGE_SESSION_POLICY` | `anonymous`                      |
    /// | `TASKFORGE_TOKEN_FILE`     | unset (memory only)              |
    pub fn from_env() -> Self {
        let base_url = std::env::var("TASKFORGE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/v1".into())
            .trim_end_matches('/')
            .to_string();

        let session_policy = std::env::var("TASKFORGE_SESSION_POLICY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        let token_path = std::env::var("TASKFORGE_TOKEN_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            base_url,
            session_policy,
            token_path,
        }
    }

    /// File-backed when `token_path` is set, otherwise memory only.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        if let Some(path) = &self.token_path {
            return Arc::new(FileTokenStore::new(path));
        }
        Arc::new(MemoryTokenStore::new())
    }

    /// An API client and a bootstrapper that shares its session.
    pub fn connect(&self) -> (Arc<ApiClient>, SessionBootstrapper) {
        let api = Arc::new(ApiClient::new(self.base_url.clone()));
        let session = SessionBootstrapper::new(api.clone(), self.token_store(), self.session_policy);
        (api, session)
    }
}
