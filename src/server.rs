//! Process wiring: database, cache, background tasks, chat loop and HTTP server.

use crate::application::services::{CodeAllocator, ConversationEngine};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::conversation::SessionStore;
use crate::domain::repositories::LinkStore;
use crate::domain::session_sweeper::run_session_sweeper;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::chat::{TelegramTransport, run_chat_loop};
use crate::infrastructure::persistence::PgLinkStore;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long shutdown waits for queued clicks to be written.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the service until Ctrl-C or SIGTERM.
///
/// Initializes, in order:
/// - PostgreSQL pool and migrations
/// - Redis cache (or NullCache fallback)
/// - Click worker and session sweeper
/// - Telegram long-poll loop, when a bot token is configured
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, the
/// chat transport can't be built, or the listener can't bind.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let link_store: Arc<dyn LinkStore> = Arc::new(PgLinkStore::new(Arc::new(pool)));
    let cache = connect_cache(&config).await;

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        link_store.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let sessions = Arc::new(SessionStore::new(chrono::Duration::seconds(
        config.session_ttl_seconds,
    )));
    let sweeper = tokio::spawn(run_session_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session_sweep_interval_seconds),
    ));

    let engine = Arc::new(ConversationEngine::new(
        link_store.clone(),
        sessions,
        CodeAllocator::new(
            link_store.clone(),
            config.code_length,
            config.code_max_attempts,
        ),
        config.base_url.clone(),
        config.list_links_limit,
    ));

    let chat_loop = match &config.telegram_bot_token {
        Some(token) => {
            let transport = TelegramTransport::new(
                &config.telegram_api_url,
                token,
                config.telegram_poll_timeout,
            )
            .context("Failed to create Telegram transport")?;
            tracing::info!("Telegram bot started");
            Some(tokio::spawn(run_chat_loop(Arc::new(transport), engine.clone())))
        }
        None => {
            tracing::info!("Telegram bot disabled");
            None
        }
    };

    let state = AppState::new(link_store, cache, click_tx, engine);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(chat_loop) = chat_loop {
        chat_loop.abort();
        let _ = chat_loop.await;
    }
    sweeper.abort();

    // Every click sender is gone now, so the worker finishes its queue and exits.
    if tokio::time::timeout(CLICK_DRAIN_TIMEOUT, click_worker)
        .await
        .is_err()
    {
        tracing::warn!("Click worker did not drain in time, pending clicks lost");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
