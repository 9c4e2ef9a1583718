use super::types::{SortColumn, SortDirection, SortSpec};

/// Public sort names an endpoint accepts, each bound to a typed column.
///
/// A leading `-` on the requested name selects descending order; the bare
/// name must be present here or the sort is rejected.
#[derive(Debug, Clone, Copy)]
pub struct SortSafelist<K: 'static> {
    entries: &'static [(&'static str, K)],
}

impl<K: SortColumn> SortSafelist<K> {
    pub const fn new(entries: &'static [(&'static str, K)]) -> Self {
        Self { entries }
    }

    pub fn resolve(&self, requested: &str) -> Option<SortSpec<K>> {
        let requested = requested.trim();
        let (name, direction) = match requested.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (requested, SortDirection::Asc),
        };

        self.entries
            .iter()
            .find(|(public, _)| *public == name)
            .map(|&(_, column)| SortSpec { column, direction })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}
