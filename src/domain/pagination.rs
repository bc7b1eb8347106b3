use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// A validated page/limit pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Option<Self> {
        if page == 0 || !(1..=MAX_LIMIT).contains(&limit) {
            return None;
        }
        Some(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub paging_counter: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

/// Builds the paging metadata for `total` matching documents. An empty result
/// still reports a single page.
pub fn page_meta(request: PageRequest, total: u64) -> PageMeta {
    let total_pages = total.div_ceil(request.limit).max(1);
    let has_prev_page = request.page > 1;
    let has_next_page = request.page < total_pages;

    PageMeta {
        limit: request.limit,
        page: request.page,
        total_pages,
        paging_counter: request.skip().saturating_add(1),
        has_prev_page,
        has_next_page,
        prev_page: has_prev_page.then(|| request.page - 1),
        next_page: has_next_page.then(|| request.page + 1),
    }
}
