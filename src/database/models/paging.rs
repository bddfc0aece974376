use serde::{Deserialize, Serialize};

/// Which slice of a result set to return.
///
/// Pages are 1-based. A `page_size` of `None` returns everything as a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: Option<u32>,
}

impl PageRequest {
    pub fn all() -> Self {
        Self { page: 1, page_size: None }
    }

    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size: Some(page_size) }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::all()
    }
}

/// One page of records plus enough bookkeeping to navigate the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    pub page: u32,
    pub page_size: u32,
    pub pages_count: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PagedList<T> {
    /// Cuts the requested page out of the full, already ordered result set.
    pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len();
        let page = request.page.max(1);

        let Some(page_size) = request.page_size.filter(|size| *size > 0) else {
            return Self {
                page_size: total_items as u32,
                pages_count: u32::from(total_items > 0),
                items: all,
                total_items,
                page: 1,
                has_next: false,
                has_previous: false,
            };
        };

        let pages_count = total_items.div_ceil(page_size as usize) as u32;
        let skip = (page as usize - 1) * page_size as usize;
        let items = all.into_iter().skip(skip).take(page_size as usize).collect();

        Self {
            items,
            total_items,
            page,
            page_size,
            pages_count,
            has_next: page < pages_count,
            has_previous: page > 1 && total_items > 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }
}
