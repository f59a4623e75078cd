//! Signed access tokens and opaque refresh tokens.
//!
//! Access tokens are HS256 JWTs carrying [`Claims`]. A refresh token is a
//! random string handed to the client once; the sessions table keeps only
//! its SHA-256 digest.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use taskforge_core::types::DbId;
use uuid::Uuid;

use crate::config::env_or;

/// Which kind of account a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Guest created through anonymous sign-in.
    Anonymous,
    /// Account with email and password.
    User,
}

impl Role {
    pub fn of(is_anonymous: bool) -> Self {
        if is_anonymous {
            Role::Anonymous
        } else {
            Role::User
        }
    }
}

/// Payload of every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id so two tokens minted in the same second differ.
    pub jti: String,
}

/// A freshly minted refresh token.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    /// Returned to the client, never stored.
    pub plaintext: String,
    /// Persisted in `user_sessions.refresh_token_hash`.
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = Uuid::new_v4().simple().to_string();
        let hash = digest(&plaintext);
        Self { plaintext, hash }
    }
}

/// Hex SHA-256 of a refresh token, used for lookups.
pub fn digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 15)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    ///
    /// # Panics
    ///
    /// When the secret is missing or empty, or a lifetime is not an integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set to a non-empty value");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Seconds an access token stays valid, as reported to clients.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    /// Mint an access token for `user_id`.
    pub fn issue(&self, user_id: DbId, role: Role) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            exp: iat + self.access_ttl_secs(),
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        decode::<Claims>(token, &key, &Validation::default()).map(|data| data.claims)
    }
}
