// Runs only when TEST_DATABASE_URL points at a disposable PostgreSQL database.

use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;
use tokio::sync::Mutex;

use puzzle_api::config::{AppConfig, FilterConfig};
use puzzle_api::database::models::{NewPuzzle, PuzzleCount};
use puzzle_api::database::{DatabaseManager, PgPuzzleStore, PuzzleStore, StoreError};
use puzzle_api::filter::{ListParams, ListQuery};

async fn connect() -> Result<Option<PgPuzzleStore>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping PostgreSQL store test");
        return Ok(None);
    };

    let mut config = AppConfig::development().database;
    config.url = Some(url);
    config.max_connections = 5;
    let pool = DatabaseManager::connect(&config).await?;
    apply_schema(&pool).await?;

    Ok(Some(PgPuzzleStore::new(pool, Duration::from_secs(5))))
}

// Tests run in parallel; DDL from two of them at once can collide
static SCHEMA_APPLIED: Mutex<bool> = Mutex::const_new(false);

async fn apply_schema(pool: &PgPool) -> Result<()> {
    let mut applied = SCHEMA_APPLIED.lock().await;
    if *applied {
        return Ok(());
    }
    let schema = include_str!("../sql/schema.sql");
    for statement in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    *applied = true;
    Ok(())
}

/// A title word unique to this run so concurrent runs do not see each other
fn run_tag() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("pgtest{}", nanos)
}

fn new_puzzle(title: String, count: i32) -> NewPuzzle {
    NewPuzzle {
        title,
        num_of_puzzles: PuzzleCount(count),
        genres: vec!["logic".to_string()],
    }
}

#[tokio::test]
async fn conditional_update_and_delete() -> Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let tag = run_tag();

    let mut puzzle = store.insert(&new_puzzle(format!("{} occ", tag), 10)).await?;
    assert_eq!(puzzle.version, 1);

    let stale = puzzle.clone();
    puzzle.title = format!("{} occ renamed", tag);
    puzzle.version = store.update(&puzzle).await?;
    assert_eq!(puzzle.version, 2);

    assert!(matches!(store.update(&stale).await, Err(StoreError::EditConflict)));
    assert_eq!(store.get(puzzle.id).await?.title, puzzle.title);

    store.delete(puzzle.id).await?;
    assert!(matches!(store.get(puzzle.id).await, Err(StoreError::NotFound)));
    assert!(matches!(store.delete(puzzle.id).await, Err(StoreError::NotFound)));
    assert!(matches!(store.update(&puzzle).await, Err(StoreError::EditConflict)));
    Ok(())
}

#[tokio::test]
async fn list_pages_with_window_count() -> Result<()> {
    let Some(store) = connect().await? else {
        return Ok(());
    };
    let tag = run_tag();

    let mut ids = Vec::new();
    for count in [5, 3, 5, 1, 9] {
        ids.push(store.insert(&new_puzzle(format!("{} list", tag), count)).await?.id);
    }

    let limits = FilterConfig {
        default_page_size: 20,
        max_page_size: 100,
    };
    let mut seen = Vec::new();
    for page in 1..=3 {
        let query = ListQuery {
            title: Some(tag.clone()),
            page: Some(page.to_string()),
            page_size: Some("2".to_string()),
            sort: Some("-num_of_puzzles".to_string()),
            ..Default::default()
        };
        let params = ListParams::from_query(&query, &limits)?;
        let (rows, metadata) = store.list(&params).await?;
        assert_eq!(metadata.total_records, 5);
        assert_eq!(metadata.last_page, 3);
        seen.extend(rows.into_iter().map(|p| (p.num_of_puzzles.get(), p.id)));
    }

    // Descending count, ties by ascending id
    assert_eq!(
        seen,
        vec![(9, ids[4]), (5, ids[0]), (5, ids[2]), (3, ids[1]), (1, ids[3])]
    );

    for id in ids {
        store.delete(id).await?;
    }
    Ok(())
}
