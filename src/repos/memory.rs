//! In-process store implementing every repo trait.
//!
//! Used when no `DATABASE_URL` is configured in development, and by tests.
//! Mirrors the PostgreSQL schema constraints that the services rely on:
//! unique emails, unique refresh token values, cascade delete on user reset.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::post_repo::{PostRepo, PostRow, ResourceOwnerLookup, SortOrder};
use crate::repos::refresh_token_repo::{RefreshTokenRepo, RefreshTokenRow};
use crate::repos::user_repo::{UserRepo, UserRow};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    posts: BTreeMap<i64, PostRow>,
    refresh_tokens: HashMap<String, RefreshTokenRow>,
    next_post_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // The lock is never held across an await, and every mutation leaves the
    // tables consistent, so a poisoned lock is safe to recover.
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> RepoResult<UserRow> {
        let mut tables = self.tables();
        if tables.users.values().any(|u| u.email == email) {
            return Err(RepoError::DuplicateConflict);
        }

        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_upgraded: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());

        Ok(row)
    }

    async fn get_user_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_id(&self, id: Uuid) -> RepoResult<Option<UserRow>> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn update_user_credential(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> RepoResult<Option<UserRow>> {
        let mut tables = self.tables();
        if tables
            .users
            .values()
            .any(|u| u.id != id && u.email == email)
        {
            return Err(RepoError::DuplicateConflict);
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn upgrade_user(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_upgraded = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset_users(&self) -> RepoResult<u64> {
        let mut tables = self.tables();
        let removed = tables.users.len() as u64;
        tables.users.clear();
        tables.posts.clear();
        tables.refresh_tokens.clear();
        Ok(removed)
    }
}

#[async_trait]
impl RefreshTokenRepo for MemoryStore {
    async fn create_refresh_token(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<RefreshTokenRow> {
        let mut tables = self.tables();
        if tables.refresh_tokens.contains_key(token) {
            return Err(RepoError::DuplicateConflict);
        }

        let now = Utc::now();
        let row = RefreshTokenRow {
            token: token.to_string(),
            user_id,
            expires_at,
            revoked_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.refresh_tokens.insert(row.token.clone(), row.clone());

        Ok(row)
    }

    async fn get_refresh_token(&self, token: &str) -> RepoResult<Option<RefreshTokenRow>> {
        Ok(self.tables().refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.refresh_tokens.get_mut(token) {
            Some(row) => {
                row.revoked_at.get_or_insert(now);
                row.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ResourceOwnerLookup for MemoryStore {
    async fn resource_owner(&self, resource_id: i64) -> RepoResult<Option<Uuid>> {
        Ok(self
            .tables()
            .posts
            .get(&resource_id)
            .map(|p| p.author_id))
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn create_post(&self, body: &str, author_id: Uuid) -> RepoResult<PostRow> {
        let mut tables = self.tables();
        tables.next_post_id += 1;

        let now = Utc::now();
        let row = PostRow {
            id: tables.next_post_id,
            body: body.to_string(),
            author_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(row.id, row.clone());

        Ok(row)
    }

    async fn list_posts(
        &self,
        author_id: Option<Uuid>,
        sort: SortOrder,
    ) -> RepoResult<Vec<PostRow>> {
        let tables = self.tables();
        // BTreeMap iterates in id order, which is also creation order here
        let mut rows: Vec<PostRow> = tables
            .posts
            .values()
            .filter(|p| author_id.is_none_or(|a| p.author_id == a))
            .cloned()
            .collect();
        if sort == SortOrder::Desc {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<PostRow>> {
        Ok(self.tables().posts.get(&id).cloned())
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables().posts.remove(&id).is_some())
    }
}
