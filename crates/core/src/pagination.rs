//! Page bookkeeping for listing endpoints.
//!
//! Pages are 1-based. Out-of-range inputs are clamped rather than rejected,
//! matching how the portal tables request data.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 500;

/// A requested page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request from optional query values, clamping both to sane bounds.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }
}

/// One page of results plus the totals the portal pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn page_count(total: usize, page_size: u32) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as usize)
}

/// Slice an in-memory result set into the requested page.
pub fn paginate<T: Clone>(items: &[T], request: &PageRequest) -> Page<T> {
    let start = request.offset().min(items.len());
    let end = (start + request.page_size as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        total: items.len(),
        total_pages: page_count(items.len(), request.page_size),
        page: request.page,
        page_size: request.page_size,
    }
}
