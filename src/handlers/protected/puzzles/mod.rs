mod collection;
mod record;

pub use collection::{create, list};
pub use record::{delete, show, update};

use crate::error::ApiError;

/// Path ids that do not parse as a positive integer cannot name a puzzle.
fn read_id_param(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found()),
    }
}
