/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - トークンの解析・検証は services::auth 側の責務
 */

use uuid::Uuid;

/// Context attached to an authenticated request.
///
/// Ownership of a specific resource is not implied; that is checked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
