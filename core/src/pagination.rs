//! Pagination windowing.
//!
//! Query-string input is untrusted: [`compute_params`] never rejects it and
//! instead falls back to safe defaults. [`build_response`] wraps a fetched
//! window in the envelope every list endpoint returns.
//!
//! ```
//! use content_core::pagination::{build_response, compute_params, PageSizePolicy};
//!
//! let policy = PageSizePolicy::new(10, 30)?;
//! let params = compute_params(Some("2"), Some("500"), policy);
//! assert_eq!((params.page, params.limit, params.skip), (2, 30, 30));
//!
//! let page = build_response(vec![1, 2, 3], 33, params.page, params.limit);
//! assert_eq!(page.next_page, None);
//! assert_eq!(page.prev_page, Some(1));
//! # Ok::<(), content_core::pagination::PolicyError>(())
//! ```

use serde::Serialize;
use thiserror::Error;

/// Largest page size the service is allowed to be configured with.
pub const MAX_PAGE_SIZE_CEILING: u64 = 30;

/// Invalid page size configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Default or maximum page size is zero
    #[error("page sizes must be at least 1 (default {default_limit}, max {max_limit})")]
    Zero {
        /// Configured default page size
        default_limit: u64,
        /// Configured maximum page size
        max_limit: u64,
    },
    /// Maximum page size exceeds [`MAX_PAGE_SIZE_CEILING`]
    #[error("max page size {0} exceeds the ceiling of {MAX_PAGE_SIZE_CEILING}")]
    AboveCeiling(u64),
}

/// Default and maximum page size, validated once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizePolicy {
    default_limit: u64,
    max_limit: u64,
}

impl PageSizePolicy {
    /// Validate a page size configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if either size is zero or the maximum exceeds
    /// [`MAX_PAGE_SIZE_CEILING`].
    pub const fn new(default_limit: u64, max_limit: u64) -> Result<Self, PolicyError> {
        if default_limit == 0 || max_limit == 0 {
            return Err(PolicyError::Zero {
                default_limit,
                max_limit,
            });
        }
        if max_limit > MAX_PAGE_SIZE_CEILING {
            return Err(PolicyError::AboveCeiling(max_limit));
        }
        Ok(Self {
            default_limit,
            max_limit,
        })
    }

    /// Page size used when the caller supplies none (or garbage).
    #[must_use]
    pub const fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Hard cap on the page size.
    #[must_use]
    pub const fn max_limit(&self) -> u64 {
        self.max_limit
    }
}

/// Sanitized `(page, limit, skip)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationParams {
    /// 1-based page number
    pub page: u64,
    /// Effective page size, never above the configured maximum
    pub limit: u64,
    /// Number of rows to skip
    pub skip: u64,
}

/// Result ordering requested through the `order` query parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending (default)
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl SortOrder {
    /// `desc` selects descending order; anything else is ascending.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// One page of results plus navigation markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    /// Items in this window
    pub items: Vec<T>,
    /// Page number these items belong to
    pub page: u64,
    /// Page size used for the query
    pub limit: u64,
    /// Total number of matching items across all pages
    pub total: u64,
    /// Next page number, if any items lie beyond this page
    pub next_page: Option<u64>,
    /// Previous page number, if this is not the first page
    pub prev_page: Option<u64>,
}

impl<T> PaginatedResponse<T> {
    /// Convert every item, keeping the envelope as is.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            next_page: self.next_page,
            prev_page: self.prev_page,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// Compute the pagination window from raw query values.
///
/// Missing, non-numeric, zero or negative values fall back to page `1` and
/// the policy's default limit. The limit is always capped at the policy's
/// maximum. There is no upper bound on the page.
#[must_use]
pub fn compute_params(
    raw_page: Option<&str>,
    raw_limit: Option<&str>,
    policy: PageSizePolicy,
) -> PaginationParams {
    let page = parse_positive(raw_page).unwrap_or(1);
    let limit = parse_positive(raw_limit)
        .unwrap_or(policy.default_limit)
        .min(policy.max_limit);
    let skip = (page - 1).saturating_mul(limit);

    PaginationParams { page, limit, skip }
}

/// Wrap a fetched window in the pagination envelope.
///
/// `next_page` is set iff `page * limit < total`; `prev_page` iff `page > 1`.
#[must_use]
pub fn build_response<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let next_page = (page.saturating_mul(limit) < total).then(|| page + 1);
    let prev_page = (page > 1).then(|| page - 1);

    PaginatedResponse {
        items,
        page,
        limit,
        total,
        next_page,
        prev_page,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn policy() -> PageSizePolicy {
        PageSizePolicy::new(10, 30).unwrap()
    }

    #[test]
    fn caps_requested_limit_at_maximum() {
        let params = compute_params(Some("2"), Some("500"), policy());
        assert_eq!(
            params,
            PaginationParams {
                page: 2,
                limit: 30,
                skip: 30
            }
        );
    }

    #[test]
    fn missing_values_use_defaults() {
        let params = compute_params(None, None, policy());
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.skip, 0);
    }

    #[test]
    fn garbage_values_fall_back() {
        for raw in ["abc", "0", "-3", "", "  ", "2.5", "1e3", "NaN"] {
            let params = compute_params(Some(raw), Some(raw), policy());
            assert_eq!(params.page, 1, "page for {raw:?}");
            assert_eq!(params.limit, 10, "limit for {raw:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let params = compute_params(Some(" 3 "), Some("\t5"), policy());
        assert_eq!((params.page, params.limit, params.skip), (3, 5, 10));
    }

    #[test]
    fn default_above_max_is_capped() {
        let policy = PageSizePolicy::new(50, 20);
        assert!(policy.is_ok());
        let params = compute_params(None, None, policy.unwrap());
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn huge_page_saturates_skip() {
        let params = compute_params(Some(&u64::MAX.to_string()), Some("30"), policy());
        assert_eq!(params.skip, u64::MAX);
    }

    #[test]
    fn policy_rejects_invalid_sizes() {
        assert_eq!(
            PageSizePolicy::new(10, 31),
            Err(PolicyError::AboveCeiling(31))
        );
        assert!(matches!(
            PageSizePolicy::new(0, 30),
            Err(PolicyError::Zero { .. })
        ));
        assert!(matches!(
            PageSizePolicy::new(10, 0),
            Err(PolicyError::Zero { .. })
        ));
    }

    #[test]
    fn empty_result_has_no_neighbours() {
        let page = build_response(Vec::<u32>::new(), 0, 1, 10);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({
                "items": [],
                "page": 1,
                "limit": 10,
                "total": 0,
                "nextPage": null,
                "prevPage": null,
            })
        );
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = build_response((0..10).collect::<Vec<_>>(), 25, 2, 10);
        assert_eq!(page.next_page, Some(3));
        assert_eq!(page.prev_page, Some(1));
    }

    #[test]
    fn page_beyond_data_is_empty_with_total() {
        let page = build_response(Vec::<u32>::new(), 25, 9, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(8));
    }

    #[test]
    fn sort_order_parsing() {
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
    }

    #[test]
    fn map_keeps_envelope() {
        let page = build_response(vec![1, 2], 12, 1, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.total, 12);
    }

    proptest! {
        #[test]
        fn envelope_invariant_holds(page in 1u64..10_000, limit in 1u64..=30, pick in 0usize..5) {
            let totals = [0, 1, limit, limit + 1, u64::MAX / 2];
            let total = totals[pick];
            let response = build_response(Vec::<u8>::new(), total, page, limit);

            prop_assert_eq!(response.next_page, (page * limit < total).then_some(page + 1));
            prop_assert_eq!(response.prev_page, (page > 1).then_some(page - 1));
        }

        #[test]
        fn effective_limit_never_exceeds_max(raw_page in ".*", raw_limit in ".*") {
            let params = compute_params(Some(&raw_page), Some(&raw_limit), policy());
            prop_assert!(params.page >= 1);
            prop_assert!((1..=30).contains(&params.limit));
            prop_assert_eq!(params.skip, (params.page - 1).saturating_mul(params.limit));
        }

        #[test]
        fn over_max_request_is_exactly_max(requested in 31u64..1_000_000) {
            let params = compute_params(None, Some(&requested.to_string()), policy());
            prop_assert_eq!(params.limit, 30);
        }
    }
}
