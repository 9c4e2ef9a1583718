use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{NewPuzzle, Puzzle};
use crate::filter::{ListParams, Metadata};

/// Outcomes of a store call other than success.
///
/// `NotFound` and `EditConflict` are domain conditions; the remaining
/// variants are infrastructure faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Runs one query under `limit`. An expired limit drops the query and is
/// reported once as `StoreError::Timeout`; the caller decides what happens next.
pub(crate) async fn with_timeout<T, F>(limit: Duration, query: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => {
            tracing::warn!("Query exceeded {:?} and was cancelled", limit);
            Err(StoreError::Timeout(limit))
        }
    }
}

/// Persistence for puzzles.
///
/// `update` is a conditional write: it only succeeds when the stored row
/// still carries `puzzle.version`, and then returns the incremented version.
#[async_trait]
pub trait PuzzleStore: Send + Sync + 'static {
    /// Inserts and returns the stored puzzle with id, created_at and version 1.
    async fn insert(&self, new: &NewPuzzle) -> StoreResult<Puzzle>;

    async fn get(&self, id: i64) -> StoreResult<Puzzle>;

    async fn update(&self, puzzle: &Puzzle) -> StoreResult<i32>;

    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// One page of matching puzzles ordered by the requested sort, then id.
    async fn list(&self, params: &ListParams) -> StoreResult<(Vec<Puzzle>, Metadata)>;

    /// Cheap liveness probe used by the healthcheck.
    async fn ping(&self) -> StoreResult<()>;
}
