use std::sync::Arc;

use taskforge_llm::TaskGenerator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: taskforge_db::DbPool,
    /// Server configuration (JWT settings, anonymous sign-in policy).
    pub config: Arc<ServerConfig>,
    /// Task generation with guaranteed fallback.
    pub generator: Arc<TaskGenerator>,
}
