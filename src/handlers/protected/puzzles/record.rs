use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::UpdatePuzzleInput;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::read_id_param;

/// GET /v1/puzzles/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    let puzzle = state.store.get(id).await?;
    Ok(ApiResponse::success(json!({ "puzzle": puzzle })))
}

/// PATCH /v1/puzzles/:id - partial update guarded by the stored version.
///
/// The write only lands if the row still carries the version read here, so
/// a concurrent writer between the read and the write yields 409 rather
/// than a lost update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePuzzleInput>, JsonRejection>,
) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    let mut puzzle = state.store.get(id).await?;
    // A missing record wins over a malformed body
    let Json(input) = payload?;

    if let Some(expected) = input.version {
        if expected != puzzle.version {
            tracing::debug!(
                "Puzzle {} is at version {}, client expected {}",
                id,
                puzzle.version,
                expected
            );
            return Err(ApiError::EditConflict);
        }
    }

    input.apply(&mut puzzle)?;
    puzzle.version = state.store.update(&puzzle).await?;

    Ok(ApiResponse::success(json!({ "puzzle": puzzle })))
}

/// DELETE /v1/puzzles/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    state.store.delete(id).await?;
    tracing::info!("Deleted puzzle {}", id);
    Ok(ApiResponse::success(json!({
        "message": "puzzle successfully deleted"
    })))
}
