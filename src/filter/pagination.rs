use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_count: u64) -> Self {
        let limit_u64 = limit.max(1) as u64;
        let total_pages = total_count.div_ceil(limit_u64);
        Self {
            current_page: page,
            total_pages,
            total_count,
            limit,
            has_next_page: (page as u64) < total_pages,
            has_prev_page: page > 1,
        }
    }
}
