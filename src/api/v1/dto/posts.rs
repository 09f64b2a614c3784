/*
 * Responsibility
 * - Posts の request/response DTO
 * - ID は公開 ID で返す (内部 ID は外に出さない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::SortOrder;

pub const MAX_POST_CHARS: usize = 140;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.body.trim().is_empty() {
            return Err("Post is empty");
        }
        if self.body.chars().count() > MAX_POST_CHARS {
            return Err("Post is too long");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortParam {
    #[default]
    Asc,
    Desc,
}

impl From<SortParam> for SortOrder {
    fn from(p: SortParam) -> Self {
        match p {
            SortParam::Asc => SortOrder::Asc,
            SortParam::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: SortParam,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String, // encoded
    pub body: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
