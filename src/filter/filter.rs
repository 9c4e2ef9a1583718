use crate::config::FilterConfig;
use crate::validator::{ValidationErrors, Validator};

use super::filter_order::SortSafelist;
use super::types::{RawFilter, SortColumn, SortSpec};

const MAX_PAGE: i64 = 10_000_000;

/// Validated pagination and sort for one list request.
///
/// Only obtainable through [`FilterDescriptor::build`], so holding one means
/// the page bounds were checked and the sort came out of a safelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterDescriptor<K> {
    page: i64,
    page_size: i64,
    sort: SortSpec<K>,
}

impl<K: SortColumn> FilterDescriptor<K> {
    pub fn build(
        raw: &RawFilter,
        safelist: &SortSafelist<K>,
        limits: &FilterConfig,
    ) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let descriptor = Self::build_into(raw, safelist, limits, &mut v);
        v.finish()?;
        // an empty validator means every field resolved
        descriptor.ok_or_else(ValidationErrors::default)
    }

    /// Validates into a shared validator so callers can merge errors from
    /// other query fields before reporting.
    pub(crate) fn build_into(
        raw: &RawFilter,
        safelist: &SortSafelist<K>,
        limits: &FilterConfig,
        v: &mut Validator,
    ) -> Option<Self> {
        let page = read_int(raw.page.as_deref(), 1, "page", v);
        let page_size = read_int(raw.page_size.as_deref(), limits.default_page_size, "page_size", v);

        if let Some(page) = page {
            v.check(page > 0, "page", "must be greater than zero");
            v.check(page <= MAX_PAGE, "page", "must be a maximum of 10 million");
        }
        if let Some(page_size) = page_size {
            v.check(page_size > 0, "page_size", "must be greater than zero");
            v.check(
                page_size <= limits.max_page_size,
                "page_size",
                format!("must be a maximum of {}", limits.max_page_size),
            );
        }

        let requested = raw.sort.as_deref().unwrap_or("id");
        let sort = safelist.resolve(requested);
        if sort.is_none() {
            tracing::debug!(
                "Rejected sort {:?}; accepted: {}",
                requested,
                safelist.names().collect::<Vec<_>>().join(", ")
            );
            v.add_error("sort", "invalid sort value");
        }

        if !v.valid() {
            return None;
        }
        Some(Self {
            page: page?,
            page_size: page_size?,
            sort: sort?,
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn sort(&self) -> SortSpec<K> {
        self.sort
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn read_int(raw: Option<&str>, default: i64, field: &str, v: &mut Validator) -> Option<i64> {
    match raw.map(str::trim) {
        None | Some("") => Some(default),
        Some(s) => match s.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                v.add_error(field, "must be an integer value");
                None
            }
        },
    }
}
