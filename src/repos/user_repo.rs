/*
 * Responsibility
 * - users テーブル向け操作 (登録 / 検索 / 認証情報更新 / upgrade フラグ)
 * - email の一意制約違反は RepoError::DuplicateConflict で返す
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub is_upgraded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `RepoError::DuplicateConflict` when the email is already registered.
    async fn create_user(&self, email: &str, hashed_password: &str) -> RepoResult<UserRow>;

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;

    async fn get_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>>;

    /// Replace email and password hash. Returns the updated row, or None for an unknown id.
    async fn update_user_credential(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> RepoResult<Option<UserRow>>;

    /// Set the upgrade flag. Returns false when no such user exists.
    async fn upgrade_user(&self, id: Uuid) -> RepoResult<bool>;

    /// Delete every user (and, by cascade, their posts and refresh tokens).
    async fn reset_users(&self) -> RepoResult<u64>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create_user(&self, email: &str, hashed_password: &str) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, hashed_password)
            VALUES ($1, $2)
            RETURNING id, email, hashed_password, is_upgraded, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, hashed_password, is_upgraded, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn get_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, hashed_password, is_upgraded, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update_user_credential(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                email = $2,
                hashed_password = $3,
                updated_at = now()
            WHERE id = $1
            RETURNING id, email, hashed_password, is_upgraded, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn upgrade_user(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_upgraded = true, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn reset_users(&self) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected())
    }
}
