//! Pagination models

/// Paging metadata of the last successful transactions fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl PaginationState {
    /// Rebuild from a response; `total_pages` is `None` for bare-array responses
    pub fn from_response(requested_page: u32, total_pages: Option<u32>, page_size: u32) -> Self {
        let total_pages = total_pages.unwrap_or(1).max(1);
        Self {
            current_page: requested_page.clamp(1, total_pages),
            total_pages,
            page_size,
        }
    }

    pub fn is_first(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page == self.total_pages
    }
}

/// Visible page links and edge controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub current_page: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array_is_single_page() {
        let state = PaginationState::from_response(4, None, 50);
        assert_eq!(state.total_pages, 1);
        assert_eq!(state.current_page, 1);
        assert!(state.is_first() && state.is_last());
    }

    #[test]
    fn test_current_page_never_exceeds_total() {
        let state = PaginationState::from_response(9, Some(3), 25);
        assert_eq!(state.current_page, 3);

        let state = PaginationState::from_response(0, Some(0), 25);
        assert_eq!((state.current_page, state.total_pages), (1, 1));
    }
}
