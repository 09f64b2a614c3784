use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::repos::refresh_token_repo::{RefreshTokenRepo, RefreshTokenRow};
use crate::services::auth::error::AuthError;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token expired")]
    Expired,

    #[error("refresh token revoked")]
    Revoked,

    #[error("random source failed: {0}")]
    Random(String),

    #[error(transparent)]
    Store(#[from] RepoError),
}

impl From<RefreshTokenError> for AuthError {
    fn from(e: RefreshTokenError) -> Self {
        match e {
            // an unknown token is just another bad credential to the caller
            RefreshTokenError::NotFound => AuthError::MalformedCredential,
            RefreshTokenError::Expired => AuthError::Expired,
            RefreshTokenError::Revoked => AuthError::Revoked,
            RefreshTokenError::Random(_) | RefreshTokenError::Store(_) => {
                AuthError::Internal(e.to_string())
            }
        }
    }
}

/// Persisted state of a refresh token, decoupled from the row layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            user_id: row.user_id,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

/// Opaque, long-lived refresh tokens.
///
/// Tokens are not rotated: a token stays usable until it expires or is revoked.
#[derive(Clone)]
pub struct RefreshTokenService {
    repo: Arc<dyn RefreshTokenRepo>,
    ttl: Duration,
}

impl std::fmt::Debug for RefreshTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenService")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl RefreshTokenService {
    pub fn new(repo: Arc<dyn RefreshTokenRepo>, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    pub async fn issue(&self, user_id: Uuid) -> Result<String, RefreshTokenError> {
        self.issue_at(user_id, Utc::now()).await
    }

    /// Generate and store a new token for `user_id`, expiring `ttl` after `now`.
    pub async fn issue_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, RefreshTokenError> {
        let token = generate_refresh_token()?;
        let expires_at = now + self.ttl;

        debug!(user_id = %user_id, expires_at = %expires_at, "Issuing refresh token");

        self.repo
            .create_refresh_token(&token, user_id, expires_at)
            .await
            .map_err(|e| {
                error!(user_id = %user_id, error = %e, "Failed to insert refresh token");
                RefreshTokenError::Store(e)
            })?;

        Ok(token)
    }

    /// Plain lookup, no expiry or revocation checks.
    pub async fn resolve(&self, token: &str) -> Result<RefreshTokenRecord, RefreshTokenError> {
        let row = self.repo.get_refresh_token(token).await.map_err(|e| {
            error!(error = %e, "Failed to look up refresh token");
            RefreshTokenError::Store(e)
        })?;

        row.map(RefreshTokenRecord::from)
            .ok_or(RefreshTokenError::NotFound)
    }

    pub async fn validate_for_refresh(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        self.validate_for_refresh_at(token, Utc::now()).await
    }

    /// Return the owner of a live token.
    ///
    /// Checked in order: exists, not expired, not revoked.
    pub async fn validate_for_refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, RefreshTokenError> {
        let record = self.resolve(token).await?;

        if now > record.expires_at {
            debug!(
                user_id = %record.user_id,
                expires_at = %record.expires_at,
                "Refresh token expired"
            );
            return Err(RefreshTokenError::Expired);
        }
        if let Some(revoked_at) = record.revoked_at {
            debug!(user_id = %record.user_id, revoked_at = %revoked_at, "Refresh token revoked");
            return Err(RefreshTokenError::Revoked);
        }

        Ok(record.user_id)
    }

    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        self.revoke_at(token, Utc::now()).await
    }

    /// Mark a token revoked. Revoking twice is not an error; an unknown token is.
    pub async fn revoke_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RefreshTokenError> {
        let found = self
            .repo
            .revoke_refresh_token(token, now)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to revoke refresh token");
                RefreshTokenError::Store(e)
            })?;

        if !found {
            return Err(RefreshTokenError::NotFound);
        }

        debug!(revoked_at = %now, "Revoked refresh token");
        Ok(())
    }
}

// 32 bytes from the OS CSPRNG, hex encoded (64 chars)
fn generate_refresh_token() -> Result<String, RefreshTokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| RefreshTokenError::Random(e.to_string()))?;
    Ok(hex::encode(bytes))
}
