use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use puzzle_api::auth::{MemoryPrincipalStore, Principal, PrincipalStore, PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE};
use puzzle_api::config::{self, AppConfig, Environment, StoreBackend};
use puzzle_api::database::{DatabaseManager, MemoryPuzzleStore, PgPrincipalStore, PgPuzzleStore, PuzzleStore};
use puzzle_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("puzzle_api=info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    tracing::info!("Starting puzzle API in {} mode", config.environment.as_str());

    anyhow::ensure!(
        !config.security.jwt_secret.is_empty(),
        "JWT_SECRET must be set outside development"
    );

    let (store, principals) = build_stores(&config).await?;
    let state = AppState::new(config.clone(), store, principals);

    if state.limiter.config().enabled {
        Arc::clone(&state.limiter).spawn_sweeper();
    }

    let app = puzzle_api::app(state);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Puzzle API listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<(Arc<dyn PuzzleStore>, Arc<dyn PrincipalStore>)> {
    match config.store {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            let timeout = config.database.query_timeout();
            Ok((
                Arc::new(PgPuzzleStore::new(pool.clone(), timeout)),
                Arc::new(PgPrincipalStore::new(pool, timeout)),
            ))
        }
        StoreBackend::Memory => {
            let principals = MemoryPrincipalStore::new();
            if config.environment == Environment::Development {
                // Local runs get one operator so `puzzlectl token issue --user-id 1` works
                principals
                    .insert(
                        Principal::user(1, "operator", "operator@localhost", true)
                            .with_permissions([PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE]),
                    )
                    .await;
            }
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok((Arc::new(MemoryPuzzleStore::new()), Arc::new(principals)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
