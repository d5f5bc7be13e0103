use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Optional page/limit pair for list queries. When both are absent the full
/// result set is returned.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PaginationParams {
    /// Page number (1-indexed).
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Option<Self> {
        if page.is_some() || limit.is_some() { Some(Self { page, limit }) } else { None }
    }

    pub fn effective_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Limit clamped to `1..=MAX_LIMIT`, defaulting when only a page was given.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    /// Saturates for absurd page numbers; such a page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.effective_page() - 1).saturating_mul(self.effective_limit())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    /// Current page number (1-indexed)
    pub page: i64,
    /// Number of items per page
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total_items: i64) -> Self {
        let total_pages = if limit > 0 { (total_items + limit - 1) / limit } else { 1 };

        Self {
            data,
            page,
            limit,
            total_items,
            total_pages,
        }
    }

    /// Wraps a list fetched for `pagination`, or the complete list when unpaginated.
    pub fn from_listing(data: Vec<T>, pagination: Option<&PaginationParams>, total_items: i64) -> Self {
        match pagination {
            Some(params) => Self::new(data, params.effective_page(), params.effective_limit(), total_items),
            None => Self::new(data, 1, total_items, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_params_means_no_pagination() {
        assert!(PaginationParams::from_query(None, None).is_none());
    }

    #[test]
    fn page_without_limit_uses_default() {
        let params = PaginationParams::from_query(Some(3), None).expect("params");
        assert_eq!(params.effective_limit(), PaginationParams::DEFAULT_LIMIT);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams { page: Some(0), limit: Some(500) };
        assert_eq!(params.effective_limit(), PaginationParams::MAX_LIMIT);
        assert_eq!(params.effective_page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let params = PaginationParams::from_query(Some(i64::MAX), Some(100)).expect("params");
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let response = PaginatedResponse::new(vec![1, 2], 1, 2, 5);
        assert_eq!(response.total_pages, 3);
    }

    #[test]
    fn unpaginated_listing_is_a_single_page() {
        let response = PaginatedResponse::from_listing(vec!["a", "b", "c"], None, 3);
        assert_eq!(response.page, 1);
        assert_eq!(response.limit, 3);
        assert_eq!(response.total_pages, 1);
    }
}
