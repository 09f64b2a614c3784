/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → store / service 生成 (AppState) → Router 組み立て
 * - Middleware の適用 (全体に http 系、/api にヒットカウンタ)
 * - axum::serve() で起動 (graceful shutdown あり)
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::{PgPostRepo, PgRefreshTokenRepo, PgUserRepo};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,content_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        // development: crash loudly. production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// PostgreSQL when `DATABASE_URL` is set (migrations run at startup),
/// otherwise the in-process store.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store");
        return Ok(AppState::in_memory(config)?);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(
        config,
        Arc::new(PgUserRepo::new(pool.clone())),
        Arc::new(PgPostRepo::new(pool.clone())),
        Arc::new(PgRefreshTokenRepo::new(pool)),
    )?;

    Ok(state)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::metrics::apply(api::v1::routes(), state.clone());

    let router = Router::new()
        .nest("/api/v1", v1)
        .nest("/admin", api::v1::admin_routes())
        .with_state(state);

    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

// Without a working signal listener the server keeps running until killed.
async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn signal_starts_shutdown() {
        let waited = tokio::time::timeout(
            Duration::from_secs(1),
            wait_for_signal(async { Ok::<(), std::io::Error>(()) }),
        )
        .await;

        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn broken_listener_never_starts_shutdown() {
        let broken = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_signal(broken)).await;

        assert!(waited.is_err());
    }
}
