//! Askstream server binary.
//!
//! Loads configuration, wires the adapters into the turn engine, and serves
//! the chat streaming API until shutdown.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use askstream::adapters::ai::{OpenAiChatConfig, OpenAiChatModel};
use askstream::adapters::http::{chat_router, ChatAppState};
use askstream::adapters::postgres::PostgresCheckpointStore;
use askstream::adapters::search::{TavilyConfig, TavilySearchProvider};
use askstream::application::{TurnEngine, TurnEngineConfig};
use askstream::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.server.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        "starting askstream backend"
    );

    // Scoped acquisition: the pool lives for the process lifetime and is
    // closed after the server stops.
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    let store = PostgresCheckpointStore::with_tables(
        pool.clone(),
        &config.database.checkpoints_table,
        &config.database.writes_table,
    );
    store.ensure_schema().await?;

    let model_key = config.ai.openai_api_key.clone().unwrap_or_default();
    let model = OpenAiChatModel::new(
        OpenAiChatConfig::new(model_key)
            .with_model(&config.ai.model)
            .with_base_url(&config.ai.base_url)
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;

    let search_key = config.search.tavily_api_key.clone().unwrap_or_default();
    let search = TavilySearchProvider::new(
        TavilyConfig::new(search_key)
            .with_base_url(&config.search.base_url)
            .with_timeout(config.search.timeout()),
    )?;

    let engine = TurnEngine::with_config(
        Arc::new(model),
        Arc::new(search),
        Arc::new(store),
        TurnEngineConfig {
            max_tool_rounds: config.ai.max_tool_rounds,
            max_search_results: config.search.max_results,
        },
    );

    let app = chat_router(ChatAppState::new(Arc::new(engine)));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down, closing database pool");
    pool.close().await;

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
