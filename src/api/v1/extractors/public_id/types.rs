/*
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する (タグ型 + alias)
 *  - decode ロジックは置かない (core 側)
 */
use super::core::PublicId;

// posts
pub enum PostTag {}
pub type PublicPostId = PublicId<PostTag>;
