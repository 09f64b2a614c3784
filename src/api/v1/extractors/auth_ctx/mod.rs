/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - handler に認証済みの呼び出し元 (AuthCtx) を渡す
 * - axum との接続は core、型は types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
