//! Caller identity for project-ledger
//!
//! The ledger does not issue credentials. An [`AuthProvider`] turns the bearer
//! token of a request into a [`CallerIdentity`]; everything downstream only
//! sees that identity.
//!
//! Two providers ship with the crate:
//! - [`JwtAuthProvider`]: HS256 tokens whose `sub` claim is the caller's UUID
//! - [`StaticTokenProvider`]: fixed token table, for development and tests

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// The authenticated caller of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerIdentity {
    id: Uuid,
}

impl CallerIdentity {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("Invalid Authorization format. Expected: Bearer <token>")]
    MalformedHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token subject is not a valid caller id")]
    InvalidSubject,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Resolves a bearer token to a caller
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}

/// Pull the token out of an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredential)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims accepted by [`JwtAuthProvider`]
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the caller's UUID
    pub sub: String,
    /// Expiration time (UTC Unix timestamp)
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp)
    pub iat: i64,
}

/// Validates HS256 tokens signed with a shared secret
#[derive(Clone)]
pub struct JwtAuthProvider {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuthProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for a caller. Used by local tooling and tests.
    pub fn sign(&self, caller: Uuid, ttl: chrono::Duration) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: caller.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AuthError::InvalidToken
        })?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidSubject)?;
        Ok(CallerIdentity::new(id))
    }
}

// =============================================================================
// Static tokens
// =============================================================================

/// Maps fixed tokens to caller ids
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    tokens: HashMap<String, Uuid>,
}

impl StaticTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, caller: Uuid) -> Self {
        self.tokens.insert(token.into(), caller);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, Uuid)> for StaticTokenProvider {
    fn from_iter<I: IntoIterator<Item = (String, Uuid)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn resolve_caller(&self, token: &str) -> Result<CallerIdentity, AuthError> {
        self.tokens
            .get(token)
            .copied()
            .map(CallerIdentity::new)
            .ok_or(AuthError::InvalidToken)
    }
}
