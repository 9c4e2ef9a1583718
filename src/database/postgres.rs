use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::database::models::{NewPuzzle, Puzzle, PuzzleCount};
use crate::database::store::{with_timeout, PuzzleStore, StoreError, StoreResult};
use crate::filter::{ListParams, Metadata};

/// PostgreSQL-backed `PuzzleStore`.
///
/// Each operation is a single statement bounded by `query_timeout`; an
/// expired timeout drops the in-flight query and surfaces `StoreError::Timeout`.
#[derive(Clone)]
pub struct PgPuzzleStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgPuzzleStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    async fn timed<T, F>(&self, query: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        with_timeout(self.query_timeout, query).await
    }
}

fn puzzle_from_row(row: &PgRow) -> Result<Puzzle, sqlx::Error> {
    Ok(Puzzle {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        title: row.try_get("title")?,
        num_of_puzzles: PuzzleCount(row.try_get("num_of_puzzles")?),
        genres: row.try_get("genres")?,
        version: row.try_get("version")?,
    })
}

#[async_trait]
impl PuzzleStore for PgPuzzleStore {
    async fn insert(&self, new: &NewPuzzle) -> StoreResult<Puzzle> {
        let query = r#"
            INSERT INTO puzzles (title, num_of_puzzles, genres)
            VALUES ($1, $2, $3)
            RETURNING id, created_at, version
        "#;

        let row = self
            .timed(
                sqlx::query(query)
                    .bind(&new.title)
                    .bind(new.num_of_puzzles.get())
                    .bind(&new.genres)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(Puzzle {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            title: new.title.clone(),
            num_of_puzzles: new.num_of_puzzles,
            genres: new.genres.clone(),
            version: row.try_get("version")?,
        })
    }

    async fn get(&self, id: i64) -> StoreResult<Puzzle> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let query = r#"
            SELECT id, created_at, title, num_of_puzzles, genres, version
            FROM puzzles
            WHERE id = $1
        "#;

        let row = self
            .timed(sqlx::query(query).bind(id).fetch_optional(&self.pool))
            .await?
            .ok_or(StoreError::NotFound)?;

        Ok(puzzle_from_row(&row)?)
    }

    async fn update(&self, puzzle: &Puzzle) -> StoreResult<i32> {
        let query = r#"
            UPDATE puzzles
            SET title = $1, num_of_puzzles = $2, genres = $3, version = version + 1
            WHERE id = $4 AND version = $5
            RETURNING version
        "#;

        let row = self
            .timed(
                sqlx::query(query)
                    .bind(&puzzle.title)
                    .bind(puzzle.num_of_puzzles.get())
                    .bind(&puzzle.genres)
                    .bind(puzzle.id)
                    .bind(puzzle.version)
                    .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => Ok(row.try_get("version")?),
            None => Err(StoreError::EditConflict),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = self
            .timed(
                sqlx::query("DELETE FROM puzzles WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, params: &ListParams) -> StoreResult<(Vec<Puzzle>, Metadata)> {
        let filter = &params.filter;
        // The ORDER BY column is a fixed identifier from the sort safelist
        let query = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, created_at, title, num_of_puzzles, genres, version
            FROM puzzles
            WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
            AND (genres @> $2 OR $2 = '{{}}')
            ORDER BY {}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            filter.sort().to_sql()
        );

        let rows = self
            .timed(
                sqlx::query(&query)
                    .bind(&params.title)
                    .bind(&params.genres)
                    .bind(filter.limit())
                    .bind(filter.offset())
                    .fetch_all(&self.pool),
            )
            .await?;

        let mut total_records: i64 = 0;
        let mut puzzles = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get("total_records")?;
            puzzles.push(puzzle_from_row(row)?);
        }

        let metadata = Metadata::calculate(total_records, filter.page(), filter.page_size());
        Ok((puzzles, metadata))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.timed(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}
