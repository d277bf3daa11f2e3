//! Offset/limit pagination contract shared by every list endpoint.

use serde::Serialize;

/// Default page size when `limit` is absent or unparseable.
pub const DEFAULT_LIMIT: i64 = 10;
/// Upper bound on page size.
pub const MAX_LIMIT: i64 = 100;

/// Normalized pagination inputs.
///
/// `limit` is clamped to `[1, 100]` -- a literal `limit=0` is normalized
/// up to 1, not treated as "no results". `offset` is floored at 0 but
/// otherwise kept raw, so pages beyond the end still report an accurate
/// `currentPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub offset: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn normalize(offset: Option<i64>, limit: Option<i64>) -> Self {
        let offset = offset.unwrap_or(0).max(0);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        PageParams { offset, limit }
    }
}

/// Pagination metadata block returned alongside every list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn compute(total_items: i64, params: PageParams) -> Self {
        let PageParams { offset, limit } = params;
        PageInfo {
            current_page: offset / limit + 1,
            total_items,
            total_pages: (total_items + limit - 1) / limit,
            limit,
            has_previous: offset > 0,
            has_next: offset + limit < total_items,
        }
    }
}

/// Paginate an in-memory result set, returning the page slice and its
/// metadata block.
pub fn paginate<T: Clone>(items: &[T], params: PageParams) -> (Vec<T>, PageInfo) {
    let info = PageInfo::compute(items.len() as i64, params);
    let start = (params.offset as usize).min(items.len());
    let end = (start + params.limit as usize).min(items.len());
    (items[start..end].to_vec(), info)
}
