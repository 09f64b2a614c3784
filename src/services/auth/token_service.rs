use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::SigningSecret;
use crate::repos::error::RepoError;
use crate::repos::user_repo::{UserRepo, UserRow};
use crate::services::auth::access_token::{self, AccessTokenError};
use crate::services::auth::password::{self, PasswordError};
use crate::services::auth::refresh_token::{RefreshTokenError, RefreshTokenService};

#[derive(Debug, Error)]
pub enum TokenServiceError {
    /// Unknown email or wrong password; callers cannot tell which.
    #[error("invalid login")]
    InvalidLogin,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    AccessToken(#[from] AccessTokenError),

    #[error(transparent)]
    RefreshToken(#[from] RefreshTokenError),

    #[error(transparent)]
    Store(#[from] RepoError),
}

/// Result of a successful login.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub user: UserRow,
    pub access_token: String,
    pub refresh_token: String,
}

/// Orchestrates login, access-token refresh and refresh-token revocation.
///
/// - access tokens come from `access_token` with the configured secret and ttl
/// - refresh tokens come from `RefreshTokenService` and are returned as-is on refresh
#[derive(Clone)]
pub struct TokenService {
    users: Arc<dyn UserRepo>,
    refresh: RefreshTokenService,
    secret: SigningSecret,
    access_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("refresh", &self.refresh)
            .field("access_ttl_seconds", &self.access_ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        refresh: RefreshTokenService,
        secret: SigningSecret,
        access_ttl: Duration,
    ) -> Self {
        Self {
            users,
            refresh,
            secret,
            access_ttl,
        }
    }

    /// Check email + password and issue an access/refresh token pair.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, TokenServiceError> {
        let user = self.users.get_user_by_email(email).await.map_err(|e| {
            error!(error = %e, "Failed to look up user by email");
            TokenServiceError::Store(e)
        })?;

        let Some(user) = user else {
            debug!("Login for unknown email");
            return Err(TokenServiceError::InvalidLogin);
        };

        match password::verify(&user.hashed_password, password) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                debug!(user_id = %user.id, "Login with wrong password");
                return Err(TokenServiceError::InvalidLogin);
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                return Err(e.into());
            }
        }

        let access_token = self.issue_access_token(user.id)?;
        let refresh_token = self.refresh.issue(user.id).await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a live refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, TokenServiceError> {
        let user_id = self.refresh.validate_for_refresh(refresh_token).await?;
        self.issue_access_token(user_id)
    }

    pub async fn revoke(&self, refresh_token: &str) -> Result<(), TokenServiceError> {
        self.refresh.revoke(refresh_token).await?;
        Ok(())
    }

    fn issue_access_token(&self, user_id: Uuid) -> Result<String, TokenServiceError> {
        access_token::issue(user_id, &self.secret, self.access_ttl).map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to sign access token");
            TokenServiceError::AccessToken(e)
        })
    }
}
