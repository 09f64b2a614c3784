/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - repos (trait object), token / auth service, id codec, リクエストカウンタ
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{AppEnv, Config};
use crate::repos::{MemoryStore, PostRepo, RefreshTokenRepo, UserRepo};
use crate::services::auth::{AuthorizationGuard, RefreshTokenService, TokenService};
use crate::services::id_codec::{self, IdCodec};

/// Hit counter for `/api/*`, shared by every request.
#[derive(Clone, Debug, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub tokens: TokenService,
    pub guard: AuthorizationGuard,
    pub id_codec: IdCodec,
    pub hits: RequestCounter,
    pub app_env: AppEnv,
    pub webhook_api_key: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("id_codec", &self.id_codec)
            .field("hits", &self.hits.get())
            .field("app_env", &self.app_env)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire services on top of the given stores.
    pub fn new(
        config: &Config,
        users: Arc<dyn UserRepo>,
        posts: Arc<dyn PostRepo>,
        refresh_tokens: Arc<dyn RefreshTokenRepo>,
    ) -> id_codec::Result<Self> {
        let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

        let refresh = RefreshTokenService::new(refresh_tokens, config.refresh_token_ttl);
        let tokens = TokenService::new(
            users.clone(),
            refresh,
            config.jwt_secret.clone(),
            config.access_token_ttl,
        );
        let guard = AuthorizationGuard::new(config.jwt_secret.clone());

        Ok(Self {
            users,
            posts,
            tokens,
            guard,
            id_codec,
            hits: RequestCounter::default(),
            app_env: config.app_env,
            webhook_api_key: config.webhook_api_key.clone(),
        })
    }

    /// Everything backed by one in-process store.
    pub fn in_memory(config: &Config) -> id_codec::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store.clone(), store)
    }
}
