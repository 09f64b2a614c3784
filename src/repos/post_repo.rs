/*
 * Responsibility
 * - posts CRUD (更新なし: author_id は作成時に固定)
 * - 所有者チェック (guard) 向けの owner 検索
 * - author_id の FK は ON DELETE CASCADE (users の reset で posts も消える)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub body: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Resolve the recorded owner of a resource. `Ok(None)` means the resource does not exist.
#[async_trait]
pub trait ResourceOwnerLookup: Send + Sync {
    async fn resource_owner(&self, resource_id: i64) -> RepoResult<Option<Uuid>>;
}

#[async_trait]
pub trait PostRepo: ResourceOwnerLookup {
    async fn create_post(&self, body: &str, author_id: Uuid) -> RepoResult<PostRow>;

    async fn list_posts(
        &self,
        author_id: Option<Uuid>,
        sort: SortOrder,
    ) -> RepoResult<Vec<PostRow>>;

    async fn get_post(&self, id: i64) -> RepoResult<Option<PostRow>>;

    async fn delete_post(&self, id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceOwnerLookup for PgPostRepo {
    async fn resource_owner(&self, resource_id: i64) -> RepoResult<Option<Uuid>> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT author_id
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(owner)
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn create_post(&self, body: &str, author_id: Uuid) -> RepoResult<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (body, author_id)
            VALUES ($1, $2)
            RETURNING id, body, author_id, created_at, updated_at
            "#,
        )
        .bind(body)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn list_posts(
        &self,
        author_id: Option<Uuid>,
        sort: SortOrder,
    ) -> RepoResult<Vec<PostRow>> {
        // ORDER BY direction cannot be bound as a parameter
        let sql = match sort {
            SortOrder::Asc => {
                r#"
                SELECT id, body, author_id, created_at, updated_at
                FROM posts
                WHERE ($1::uuid IS NULL OR author_id = $1)
                ORDER BY created_at ASC, id ASC
                "#
            }
            SortOrder::Desc => {
                r#"
                SELECT id, body, author_id, created_at, updated_at
                FROM posts
                WHERE ($1::uuid IS NULL OR author_id = $1)
                ORDER BY created_at DESC, id DESC
                "#
            }
        };

        let rows = sqlx::query_as::<_, PostRow>(sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(rows)
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, body, author_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
