#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use puzzle_api::auth::{MemoryPrincipalStore, Principal, PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE};
use puzzle_api::config::{AppConfig, StoreBackend};
use puzzle_api::database::{MemoryPuzzleStore, PuzzleStore};
use puzzle_api::AppState;

/// Activated, `puzzles:read` only
pub const READER: i64 = 1;
/// Activated, `puzzles:read` and `puzzles:write`
pub const WRITER: i64 = 2;
/// Holds both permissions but is not activated
pub const INACTIVE: i64 = 3;
/// Activated, no permissions
pub const NOBODY: i64 = 4;

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, user_id: i64) -> String {
        self.state
            .guard
            .issue_token(user_id, chrono::Duration::hours(1))
            .expect("failed to issue test token")
    }

    pub async fn create_puzzle(&self, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/v1/puzzles"))
            .bearer_auth(self.token(WRITER))
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == reqwest::StatusCode::CREATED, "create failed: {}", res.status());
        let body = res.json::<Value>().await?;
        Ok(body["data"]["puzzle"].clone())
    }
}

/// Development preset against the in-memory store, rate limiting off
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.store = StoreBackend::Memory;
    config.api.enable_rate_limiting = false;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_with(test_config()).await
}

pub async fn spawn_with(config: AppConfig) -> Result<TestServer> {
    spawn_with_store(config, Arc::new(MemoryPuzzleStore::new())).await
}

/// Serves the app in-process on an unused port with the seeded test users
pub async fn spawn_with_store(config: AppConfig, store: Arc<dyn PuzzleStore>) -> Result<TestServer> {
    let principals = MemoryPrincipalStore::new();
    principals
        .insert(Principal::user(READER, "reader", "reader@example.com", true).with_permissions([PERMISSION_PUZZLES_READ]))
        .await;
    principals
        .insert(
            Principal::user(WRITER, "writer", "writer@example.com", true)
                .with_permissions([PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE]),
        )
        .await;
    principals
        .insert(
            Principal::user(INACTIVE, "inactive", "inactive@example.com", false)
                .with_permissions([PERMISSION_PUZZLES_READ, PERMISSION_PUZZLES_WRITE]),
        )
        .await;
    principals
        .insert(Principal::user(NOBODY, "nobody", "nobody@example.com", true))
        .await;

    let state = AppState::new(config, store, Arc::new(principals));

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let app = puzzle_api::app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
        client: reqwest::Client::new(),
    })
}
