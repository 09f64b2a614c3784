/*
 * Responsibility
 * - Users の request/response DTO
 * - validate() は形式チェックのみ (一意性は store 側)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::UserRow;

/// Body of POST /users, PUT /users and POST /login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("Email is empty");
        }
        if self.password.is_empty() {
            return Err("Password is empty");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub is_upgraded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            is_upgraded: row.is_upgraded,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
