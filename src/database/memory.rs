//! In-memory `PuzzleStore` with the same semantics as the PostgreSQL one.
//!
//! Used by the test suite and by `STORE_BACKEND=memory` for local runs.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{NewPuzzle, Puzzle};
use crate::database::store::{PuzzleStore, StoreError, StoreResult};
use crate::filter::{ListParams, Metadata, PuzzleSort, SortDirection};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Puzzle>,
}

#[derive(Debug, Default)]
pub struct MemoryPuzzleStore {
    table: RwLock<Table>,
}

impl MemoryPuzzleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PuzzleStore for MemoryPuzzleStore {
    async fn insert(&self, new: &NewPuzzle) -> StoreResult<Puzzle> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let puzzle = Puzzle {
            id: table.next_id,
            created_at: Utc::now(),
            title: new.title.clone(),
            num_of_puzzles: new.num_of_puzzles,
            genres: new.genres.clone(),
            version: 1,
        };
        table.rows.insert(puzzle.id, puzzle.clone());
        Ok(puzzle)
    }

    async fn get(&self, id: i64) -> StoreResult<Puzzle> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, puzzle: &Puzzle) -> StoreResult<i32> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&puzzle.id) {
            Some(stored) if stored.version == puzzle.version => {
                stored.title = puzzle.title.clone();
                stored.num_of_puzzles = puzzle.num_of_puzzles;
                stored.genres = puzzle.genres.clone();
                stored.version += 1;
                Ok(stored.version)
            }
            _ => Err(StoreError::EditConflict),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }
        match self.table.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list(&self, params: &ListParams) -> StoreResult<(Vec<Puzzle>, Metadata)> {
        let table = self.table.read().await;
        let query_words = words(&params.title);

        let mut matching: Vec<&Puzzle> = table
            .rows
            .values()
            .filter(|p| params.title.is_empty() || matches_title(&p.title, &query_words))
            .filter(|p| params.genres.iter().all(|g| p.genres.contains(g)))
            .collect();

        let sort = params.filter.sort();
        matching.sort_by(|a, b| {
            let primary = compare_by(sort.column, a, b);
            let primary = match sort.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let page: Vec<Puzzle> = matching
            .into_iter()
            .skip(params.filter.offset().max(0) as usize)
            .take(params.filter.limit().max(0) as usize)
            .cloned()
            .collect();

        // The window count only exists on returned rows, so a page past the
        // end reports no total.
        let total = if page.is_empty() { 0 } else { total };
        let metadata = Metadata::calculate(total, params.filter.page(), params.filter.page_size());
        Ok((page, metadata))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn compare_by(column: PuzzleSort, a: &Puzzle, b: &Puzzle) -> Ordering {
    match column {
        PuzzleSort::Id => a.id.cmp(&b.id),
        PuzzleSort::Title => a.title.cmp(&b.title),
        PuzzleSort::NumOfPuzzles => a.num_of_puzzles.cmp(&b.num_of_puzzles),
        PuzzleSort::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Lowercased alphanumeric words, like the `simple` text search config
fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_title(title: &str, query_words: &HashSet<String>) -> bool {
    if query_words.is_empty() {
        return false;
    }
    let title_words = words(title);
    query_words.iter().all(|w| title_words.contains(w))
}
