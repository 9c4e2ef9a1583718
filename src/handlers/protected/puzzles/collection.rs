use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::CreatePuzzleInput;
use crate::filter::{ListParams, ListQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /v1/puzzles - filtered, sorted, paginated listing
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(query) = query?;
    let params = ListParams::from_query(&query, &state.config.filter)?;

    let (puzzles, metadata) = state.store.list(&params).await?;

    Ok(ApiResponse::success(json!({
        "puzzles": puzzles,
        "metadata": metadata
    })))
}

/// POST /v1/puzzles
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePuzzleInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload?;
    let new = input.into_new_puzzle()?;

    let puzzle = state.store.insert(&new).await?;
    tracing::info!("Created puzzle {} (version {})", puzzle.id, puzzle.version);

    let location = format!("/v1/puzzles/{}", puzzle.id);
    Ok(ApiResponse::created(json!({ "puzzle": puzzle }), location))
}
