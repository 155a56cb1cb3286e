//! Pagination parameter parsing.
//!
//! Malformed or out-of-range values degrade to defaults instead of failing.

use crate::query::params::QueryParams;

pub const BOOK_PAGE_SIZE_DEFAULT: u32 = 32;
pub const BOOK_PAGE_SIZE_MAX: u32 = 100;

/// Parses a category window offset.
///
/// Non-integers and negative values become `0`; values past `u32::MAX`
/// saturate.
pub fn parse_offset(value: Option<&str>) -> u32 {
    match value.and_then(|raw| raw.trim().parse::<i64>().ok()) {
        Some(offset) if offset > 0 => u32::try_from(offset).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// One-based page window over a book listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: BOOK_PAGE_SIZE_DEFAULT,
        }
    }
}

impl PageRequest {
    /// Reads `page` and `page_size`.
    ///
    /// - `page`: missing, malformed or `< 1` means page 1.
    /// - `page_size`: missing, malformed or `< 1` means the default; larger
    ///   values clamp to [`BOOK_PAGE_SIZE_MAX`].
    pub fn from_params(params: &QueryParams) -> Self {
        let page = params
            .get("page")
            .and_then(parse_positive)
            .unwrap_or(1);
        let page_size = params
            .get("page_size")
            .and_then(parse_positive)
            .map_or(BOOK_PAGE_SIZE_DEFAULT, |size| size.min(BOOK_PAGE_SIZE_MAX));

        Self { page, page_size }
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Whether rows remain after this page for a listing of `total` rows.
    pub fn has_next(&self, total: u64) -> bool {
        self.offset() + u64::from(self.page_size) < total
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|value| *value > 0)
}
