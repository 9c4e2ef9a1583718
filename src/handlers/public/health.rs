use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET /v1/healthcheck - service status and storage reachability
pub async fn healthcheck(State(state): State<AppState>) -> Response {
    let environment = state.config.environment.as_str();
    let version = env!("CARGO_PKG_VERSION");

    match state.store.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "available",
            "environment": environment,
            "version": version,
            "database": "ok"
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Healthcheck storage probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "environment": environment,
                        "version": version,
                        "database": "unavailable"
                    }
                })),
            )
                .into_response()
        }
    }
}
