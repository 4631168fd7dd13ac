//! Bookstock Server - Library catalog inventory
//!
//! A Rust REST API server tracking available copies of library books.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt};

use bookstock_server::{
    api,
    config::{AppConfig, LoggingConfig, StoreBackend},
    repository::{BookStore, MemoryBookStore, PgBookStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing; the guard flushes file logs on shutdown
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Bookstock Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn BookStore> = match config.database.backend {
        StoreBackend::Postgres => {
            // Create database connection pool
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");

            Arc::new(PgBookStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data will not survive a restart");
            Arc::new(MemoryBookStore::new())
        }
    };

    let state = AppState {
        services: Arc::new(Services::new(store)),
    };

    // Build router
    let app = api::create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    // Start server
    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("Invalid host address")?,
        config.server.port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber: env filter plus a pretty or JSON fmt
/// layer, writing to stdout or to a daily rolling file.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bookstock_server={},tower_http=debug", logging.level).into()
    });

    let (writer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "bookstock.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(logging.directory.is_none())
        .with_writer(writer);
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    guard
}
