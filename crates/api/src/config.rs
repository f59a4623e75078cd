use std::fmt::Debug;
use std::str::FromStr;

use taskforge_llm::GenerationConfig;

use crate::auth::jwt::JwtConfig;

/// Everything the server reads from the environment at startup.
///
/// | Env var                | Default                 |
/// |------------------------|-------------------------|
/// | `HOST`                 | `0.0.0.0`               |
/// | `PORT`                 | `3000`                  |
/// | `CORS_ORIGINS`         | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS` | `30`                    |
/// | `ALLOW_ANONYMOUS`      | `true`                  |
///
/// JWT and model settings are documented on their own types.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Gates `POST /auth/anonymous`.
    pub allow_anonymous: bool,
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// On a value that does not parse, so bad deployments fail at startup.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            allow_anonymous: env_or("ALLOW_ANONYMOUS", true),
            jwt: JwtConfig::from_env(),
            generation: GenerationConfig::from_env(),
        }
    }
}

/// Parse `name` from the environment, or `default` when unset.
pub(crate) fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name}={raw:?} is invalid: {e:?}")),
        Err(_) => default,
    }
}
