/*
 * Responsibility
 * - service が使う store の契約 (集約ごとに trait を 1 つ)
 * - PostgreSQL 実装 (sqlx) とプロセス内実装
 */
pub mod error;
pub mod memory;
pub mod post_repo;
pub mod refresh_token_repo;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
pub use memory::MemoryStore;
pub use post_repo::{PgPostRepo, PostRepo, PostRow, ResourceOwnerLookup, SortOrder};
pub use refresh_token_repo::{PgRefreshTokenRepo, RefreshTokenRepo, RefreshTokenRow};
pub use user_repo::{PgUserRepo, UserRepo, UserRow};
