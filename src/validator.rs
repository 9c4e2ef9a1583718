use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use thiserror::Error;

/// Field-keyed validation failures, surfaced to clients as `field_errors`
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("request failed validation: {fields:?}")]
pub struct ValidationErrors {
    pub fields: HashMap<String, String>,
}

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Collects validation failures; only the first message per field is kept.
#[derive(Debug, Default)]
pub struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { fields: self.errors })
        }
    }
}

pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        v.check(false, "title", "must not be more than 500 bytes long");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("title"), Some("must be provided"));
        assert_eq!(errors.fields.len(), 1);
    }

    #[test]
    fn passing_checks_are_valid() {
        let mut v = Validator::new();
        v.check(true, "page", "must be greater than zero");
        assert!(v.valid());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn unique_detects_duplicates() {
        assert!(unique(&["a", "b", "c"]));
        assert!(!unique(&["a", "b", "a"]));
        assert!(unique::<&str>(&[]));
    }
}
