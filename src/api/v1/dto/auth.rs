/*
 * Responsibility
 * - login / refresh の response DTO (login の request は CredentialsRequest を流用)
 */
use serde::Serialize;

use super::users::UserResponse;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
