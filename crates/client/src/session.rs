//! Session bootstrap and token persistence.
//!
//! On entry the [`SessionBootstrapper`] resolves a session before any
//! project or task loads: it refreshes stored tokens when it has them and
//! otherwise applies the configured [`SessionPolicy`]. The outcome is
//! published on a `watch` channel so views can wait for it.

use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskforge_db::models::user::UserResponse;
use tokio::sync::watch;

use crate::error::{ClientError, ClientResult};
use crate::services::{AuthBackend, AuthSession, StoredTokens};
use crate::store::ProjectStore;

// ---------------------------------------------------------------------------
// Policy and state
// ---------------------------------------------------------------------------

/// What to do when no existing session can be resumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Establish an anonymous session.
    #[default]
    Anonymous,
    /// Stop and ask the user to sign in.
    RequireSignIn,
}

impl FromStr for SessionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anonymous" => Ok(SessionPolicy::Anonymous),
            "require-sign-in" | "require_sign_in" | "sign-in" => Ok(SessionPolicy::RequireSignIn),
            other => Err(format!("unknown session policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Resolving,
    Authenticated(UserResponse),
    /// Redirect to the sign-in surface.
    SignInRequired,
    /// Resolution failed for a transient reason such as the network.
    /// Retry with [`SessionBootstrapper::resolve`].
    Failed(String),
}

impl SessionState {
    pub fn user(&self) -> Option<&UserResponse> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionState::Resolving)
    }
}

// ---------------------------------------------------------------------------
// Token storage
// ---------------------------------------------------------------------------

/// Persists tokens across restarts.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> ClientResult<Option<StoredTokens>>;
    async fn save(&self, tokens: &StoredTokens) -> ClientResult<()>;
    async fn clear(&self) -> ClientResult<()>;
}

/// Keeps tokens for the life of the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> ClientResult<std::sync::MutexGuard<'_, Option<StoredTokens>>> {
        self.tokens
            .lock()
            .map_err(|_| ClientError::Storage("token store lock poisoned".into()))
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> ClientResult<Option<StoredTokens>> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, tokens: &StoredTokens) -> ClientResult<()> {
        *self.slot()? = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Stores tokens as a JSON file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> ClientResult<Option<StoredTokens>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Storage(e.to_string())),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| ClientError::Storage(format!("corrupt token file: {e}")))
    }

    async fn save(&self, tokens: &StoredTokens) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ClientError::Storage(e.to_string()))?;
            }
        }
        let json =
            serde_json::to_string(tokens).map_err(|e| ClientError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrapper
// ---------------------------------------------------------------------------

pub struct SessionBootstrapper {
    auth: Arc<dyn AuthBackend>,
    tokens: Arc<dyn TokenStore>,
    policy: SessionPolicy,
    state: watch::Sender<SessionState>,
}

impl SessionBootstrapper {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        tokens: Arc<dyn TokenStore>,
        policy: SessionPolicy,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Resolving);
        Self {
            auth,
            tokens,
            policy,
            state,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resume or establish a session. Safe to call again after `Failed`.
    pub async fn resolve(&self) -> SessionState {
        self.state.send_replace(SessionState::Resolving);

        let stored = match self.tokens.load().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored tokens, starting fresh");
                None
            }
        };

        if let Some(stored) = stored {
            match self.auth.refresh(&stored.refresh_token).await {
                Ok(session) => return self.establish(session).await,
                Err(e) if e.is_auth_required() => {
                    tracing::info!("Stored session expired or revoked");
                    self.forget_tokens().await;
                }
                Err(e) => return self.fail(e),
            }
        }

        self.apply_policy().await
    }

    /// Recover from an expired access token.
    ///
    /// Exchanges the stored refresh token once and republishes the outcome.
    /// When the refresh token is gone too, the policy decides: a new
    /// anonymous session or [`SessionState::SignInRequired`]. Unlike
    /// [`resolve`](Self::resolve) the current state stays visible until the
    /// outcome is known.
    pub async fn renew(&self) -> SessionState {
        let stored = self.tokens.load().await.ok().flatten();
        let Some(stored) = stored else {
            return self.apply_policy().await;
        };

        match self.auth.refresh(&stored.refresh_token).await {
            Ok(session) => {
                tracing::debug!("Access token renewed");
                self.establish(session).await
            }
            Err(e) if e.is_auth_required() => {
                tracing::info!("Refresh token rejected, session ended");
                self.forget_tokens().await;
                self.apply_policy().await
            }
            Err(e) => self.fail(e),
        }
    }

    /// Run `op`; if it fails with [`ClientError::AuthRequired`], renew the
    /// session and run it once more.
    ///
    /// The retry only happens when renewal kept the same user. A fresh
    /// anonymous account owns none of the data the call was after, so in
    /// that case the original error is returned.
    pub async fn with_renewal<T, F, Fut>(&self, mut op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let err = match op().await {
            Err(e) if e.is_auth_required() => e,
            other => return other,
        };

        let before = self.state().user().map(|user| user.id);
        match self.renew().await {
            SessionState::Authenticated(user) if Some(user.id) == before => op().await,
            _ => Err(err),
        }
    }

    /// Wait until the current resolution finishes.
    pub async fn wait_until_resolved(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let resolved = match rx.wait_for(SessionState::is_resolved).await {
            Ok(state) => (*state).clone(),
            Err(_) => self.state(),
        };
        resolved
    }

    /// Sign in with credentials from the sign-in surface.
    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<UserResponse> {
        let session = self.auth.sign_in(email, password).await?;
        let user = session.user.clone();
        self.establish(session).await;
        Ok(user)
    }

    /// Clear the selection first, then revoke server-side and drop the
    /// stored tokens. Local state is signed out even if revocation fails.
    pub async fn sign_out(&self, store: &ProjectStore) -> ClientResult<()> {
        store.clear();
        let revoked = self.auth.sign_out().await;
        if let Err(e) = &revoked {
            tracing::warn!(error = %e, "Session revocation failed");
        }
        self.forget_tokens().await;
        self.publish(SessionState::SignInRequired);
        revoked
    }

    // ---- private helpers ----

    async fn establish(&self, session: AuthSession) -> SessionState {
        if let Err(e) = self.tokens.save(&session.tokens()).await {
            tracing::warn!(error = %e, "Could not persist session tokens");
        }
        tracing::info!(
            user_id = session.user.id,
            anonymous = session.user.is_anonymous,
            "Session established"
        );
        self.publish(SessionState::Authenticated(session.user))
    }

    async fn forget_tokens(&self) {
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "Could not clear stored tokens");
        }
    }

    async fn apply_policy(&self) -> SessionState {
        match self.policy {
            SessionPolicy::Anonymous => match self.auth.sign_in_anonymously().await {
                Ok(session) => self.establish(session).await,
                Err(e) if e.is_forbidden() => {
                    tracing::info!(error = %e, "Anonymous sign-in refused, asking for credentials");
                    self.publish(SessionState::SignInRequired)
                }
                Err(e) => self.fail(e),
            },
            SessionPolicy::RequireSignIn => self.publish(SessionState::SignInRequired),
        }
    }

    fn fail(&self, err: ClientError) -> SessionState {
        tracing::warn!(error = %err, "Session resolution failed");
        self.publish(SessionState::Failed(err.to_string()))
    }

    fn publish(&self, state: SessionState) -> SessionState {
        self.state.send_replace(state.clone());
        state
    }
}
