use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

/// DB access for refresh token persistence.
///
/// Notes:
/// - `token` is the opaque value handed to the client and is the primary key,
///   so the uniqueness constraint is the collision backstop.
/// - Rows are never deleted by the auth flow; expired/revoked rows are ignored
///   by the service layer and only go away with their owner.
#[async_trait]
pub trait RefreshTokenRepo: Send + Sync {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRow>;

    async fn get_refresh_token(&self, token: &str) -> RepoResult<Option<RefreshTokenRow>>;

    /// Mark a token revoked. The first revocation timestamp is kept on repeated calls.
    ///
    /// Returns false when the token does not exist.
    async fn revoke_refresh_token(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool>;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct PgRefreshTokenRepo {
    pool: PgPool,
}

impl PgRefreshTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepo for PgRefreshTokenRepo {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRow> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, expires_at, revoked_at, created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_refresh_token(&self, token: &str) -> RepoResult<Option<RefreshTokenRow>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, user_id, expires_at, revoked_at, created_at, updated_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn revoke_refresh_token(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let done = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = $2
            WHERE token = $1
            "#,
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(done.rows_affected() > 0)
    }
}
