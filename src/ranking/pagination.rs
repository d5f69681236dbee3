use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: u64,
    pub total_pages: u64,
}

pub struct Paginator;

impl Paginator {
    /// `ceil(total_items / page_size)`. A zero page size yields zero pages.
    pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        total_items.div_ceil(page_size)
    }

    /// Clamp into `[1, max(total_pages, 1)]`. Page 1 is the floor even when
    /// there are no pages at all.
    pub fn clamp_page(requested: i64, total_pages: u64) -> u64 {
        let upper = total_pages.max(1) as i64;
        requested.clamp(1, upper) as u64
    }

    pub fn state(requested: i64, total_items: u64, page_size: u64) -> PaginationState {
        let total_pages = Self::total_pages(total_items, page_size);
        PaginationState {
            current_page: Self::clamp_page(requested, total_pages),
            total_pages,
        }
    }
}

impl PaginationState {
    /// Zero-based row offset of the current page.
    pub fn offset(&self, page_size: u64) -> u64 {
        (self.current_page - 1) * page_size
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(Paginator::total_pages(0, 50), 0);
        assert_eq!(Paginator::total_pages(1, 50), 1);
        assert_eq!(Paginator::total_pages(100, 50), 2);
        assert_eq!(Paginator::total_pages(101, 50), 3);
        assert_eq!(Paginator::total_pages(10, 0), 0);
    }

    #[test]
    fn test_clamp_page_stays_in_range() {
        for total in [0u64, 1, 2, 7] {
            let upper = total.max(1);
            for requested in [-5, 0, 1, total as i64, total as i64 + 10] {
                let page = Paginator::clamp_page(requested, total);
                assert!(page >= 1 && page <= upper, "requested {} of {}", requested, total);
            }
        }
        assert_eq!(Paginator::clamp_page(i64::MIN, 3), 1);
        assert_eq!(Paginator::clamp_page(i64::MAX, 3), 3);
    }

    #[test]
    fn test_empty_state_floor() {
        let state = Paginator::state(1, 0, 50);
        assert_eq!(state.total_pages, 0);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.offset(50), 0);
        assert!(!state.has_next());
        assert!(!state.has_previous());
    }

    #[test]
    fn test_offsets() {
        let state = Paginator::state(3, 120, 50);
        assert_eq!(state.current_page, 3);
        assert_eq!(state.offset(50), 100);
        assert!(state.has_previous());
        assert!(!state.has_next());
    }
}
