use crate::models::PageWindow;

/// Number of page links shown when nothing else is configured
pub const DEFAULT_MAX_VISIBLE: u32 = 5;

/// Compute the visible page links around `current_page`.
///
/// The window is centered on the current page and clamped to
/// `[1, total_pages]`; when the upper end clamps, the start shifts down so
/// the full `max_visible` budget is still used.
pub fn compute_window(current_page: u32, total_pages: u32, max_visible: u32) -> PageWindow {
    let total = total_pages.max(1);
    let max_visible = max_visible.max(1);
    let current = current_page.clamp(1, total);

    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = start.saturating_add(max_visible - 1).min(total);

    if end - start + 1 < max_visible && start > 1 {
        start = end.saturating_sub(max_visible - 1).max(1);
    }

    PageWindow {
        pages: (start..=end).collect(),
        current_page: current,
        prev_enabled: current > 1,
        next_enabled: current < total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_on_first_page() {
        let window = compute_window(1, 3, 5);
        assert_eq!(window.pages, vec![1, 2, 3]);
        assert!(!window.prev_enabled);
        assert!(window.next_enabled);
    }

    #[test]
    fn test_window_on_last_page_uses_full_budget() {
        let window = compute_window(10, 10, 5);
        assert_eq!(window.pages, vec![6, 7, 8, 9, 10]);
        assert!(window.prev_enabled);
        assert!(!window.next_enabled);
    }

    #[test]
    fn test_window_is_centered_mid_range() {
        let window = compute_window(7, 20, 5);
        assert_eq!(window.pages, vec![5, 6, 7, 8, 9]);

        let window = compute_window(2, 20, 5);
        assert_eq!(window.pages, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_single_page() {
        let window = compute_window(1, 1, DEFAULT_MAX_VISIBLE);
        assert_eq!(window.pages, vec![1]);
        assert!(!window.prev_enabled && !window.next_enabled);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let window = compute_window(50, 4, 5);
        assert_eq!(window.pages, vec![1, 2, 3, 4]);
        assert_eq!(window.current_page, 4);

        let window = compute_window(0, 0, 0);
        assert_eq!(window.pages, vec![1]);
    }
}
