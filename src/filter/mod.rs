pub mod types;
pub mod filter;
pub mod filter_order;
pub mod params;

pub use types::*;
pub use filter::FilterDescriptor;
pub use filter_order::SortSafelist;
pub use params::{ListParams, ListQuery, PuzzleSort, PUZZLE_SORT_SAFELIST};
