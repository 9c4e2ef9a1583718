use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sortable column of some table.
///
/// Implementors are closed enums; `sql_column` must return a fixed identifier
/// so that nothing a client sends can reach the ORDER BY clause.
pub trait SortColumn: Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    fn sql_column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<K> {
    pub column: K,
    pub direction: SortDirection,
}

impl<K: SortColumn> SortSpec<K> {
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column.sql_column(), self.direction.to_sql())
    }
}

/// Pagination/sort fields exactly as they arrived in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilter {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// All-zero metadata when nothing matched
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 || page_size <= 0 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
