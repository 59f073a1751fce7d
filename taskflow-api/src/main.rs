//! # Taskflow API Server
//!
//! REST backend for user registration, token authentication and task
//! tracking through the `TODO → IN_PROGRESS → IN_TESTING → DONE` lifecycle.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskflow-api
//! STORE=memory cargo run -p taskflow-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use taskflow_api::{
    app::{build_router, AppState},
    config::{Config, StoreKind},
    server::{serve_with_grace, shutdown_signal},
};
use taskflow_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, PoolConfig},
    },
    store::{InMemoryStore, PgStore, Store},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskflow_api=debug,taskflow_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskflow API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set, signing tokens with the development default");
    }

    let mut pool = None;
    let store: Arc<dyn Store> = match config.store {
        StoreKind::Memory => {
            tracing::info!("Using in-memory store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        StoreKind::Postgres => {
            let url = config.database_url();
            ensure_database_exists(&url)
                .await
                .context("failed to ensure database exists")?;

            let pg = create_pool(PoolConfig {
                url,
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await
            .context("failed to connect to database")?;

            run_migrations(&pg).await.context("failed to run migrations")?;

            pool = Some(pg.clone());
            Arc::new(PgStore::new(pg))
        }
    };

    let bind_address = config.bind_address();
    let grace = config.shutdown_grace();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    let app = build_router(AppState::new(store, config));
    let result = serve_with_grace(listener, app, shutdown_signal(), grace).await;

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    result?;
    tracing::info!("Shutdown complete");
    Ok(())
}
