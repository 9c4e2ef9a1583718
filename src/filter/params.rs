use serde::Deserialize;

use crate::config::FilterConfig;
use crate::validator::{ValidationErrors, Validator};

use super::filter::FilterDescriptor;
use super::filter_order::SortSafelist;
use super::types::{RawFilter, SortColumn};

/// Sortable puzzle columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleSort {
    Id,
    Title,
    NumOfPuzzles,
    CreatedAt,
}

impl SortColumn for PuzzleSort {
    fn sql_column(&self) -> &'static str {
        match self {
            PuzzleSort::Id => "id",
            PuzzleSort::Title => "title",
            PuzzleSort::NumOfPuzzles => "num_of_puzzles",
            PuzzleSort::CreatedAt => "created_at",
        }
    }
}

pub const PUZZLE_SORT_SAFELIST: SortSafelist<PuzzleSort> = SortSafelist::new(&[
    ("id", PuzzleSort::Id),
    ("title", PuzzleSort::Title),
    ("num_of_puzzles", PuzzleSort::NumOfPuzzles),
    ("created_at", PuzzleSort::CreatedAt),
]);

/// Query string of `GET /v1/puzzles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub title: Option<String>,
    /// Comma-separated genres that must all be present
    pub genres: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Everything the store needs to run a puzzle listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub title: String,
    pub genres: Vec<String>,
    pub filter: FilterDescriptor<PuzzleSort>,
}

impl ListParams {
    pub fn from_query(query: &ListQuery, limits: &FilterConfig) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();

        let title = query.title.as_deref().unwrap_or("").trim().to_string();
        let genres = read_csv(query.genres.as_deref());
        let raw = RawFilter {
            page: query.page.clone(),
            page_size: query.page_size.clone(),
            sort: query.sort.clone(),
        };
        let filter = FilterDescriptor::build_into(&raw, &PUZZLE_SORT_SAFELIST, limits, &mut v);

        v.finish()?;
        let filter = filter.ok_or_else(ValidationErrors::default)?;
        Ok(Self { title, genres, filter })
    }
}

fn read_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
