/*
 * Responsibility
 * - middleware 層の公開インターフェース
 * - http: request id / body limit / timeout / trace
 * - metrics: /api 配下のリクエストカウンタ
 */
pub mod http;
pub mod metrics;
