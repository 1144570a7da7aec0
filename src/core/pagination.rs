pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a window, clamping both values to at least 1
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Parse raw `page`/`size` values
    ///
    /// Non-numeric input falls back to the defaults; numeric input below 1
    /// is clamped to 1.
    pub fn parse(page: Option<&str>, size: Option<&str>, default_size: usize) -> Self {
        Self::new(
            parse_positive(page, DEFAULT_PAGE),
            parse_positive(size, default_size),
        )
    }

    /// Index of the first item on this page
    #[inline]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.size)
    }
}

fn parse_positive(value: Option<&str>, default: usize) -> usize {
    let Some(value) = value else {
        return default;
    };

    match value.trim().parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => usize::try_from(n).unwrap_or(default),
        Err(_) => default,
    }
}

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Item count before pagination
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

/// Slice `items` into the `[offset, offset + size)` window
///
/// A page past the end is empty, not an error. A hand-built request with a
/// zero page or size is clamped like `PageRequest::new`.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let request = PageRequest::new(request.page, request.size);
    let total = items.len();
    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.size)
        .collect();

    Page {
        items,
        total,
        page: request.page,
        size: request.size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_and_clamping() {
        assert_eq!(PageRequest::parse(None, None, 10), PageRequest::new(1, 10));
        assert_eq!(PageRequest::parse(Some("abc"), Some("x"), 10), PageRequest::new(1, 10));
        assert_eq!(PageRequest::parse(Some("0"), Some("-5"), 10), PageRequest::new(1, 1));
        assert_eq!(PageRequest::parse(Some(" 3 "), Some("25"), 10), PageRequest::new(3, 25));
        assert_eq!(PageRequest::parse(None, None, 7).size, 7);
    }

    #[test]
    fn test_paginate_window() {
        let page = paginate((0..25).collect::<Vec<_>>(), PageRequest::new(3, 10));

        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total, 25);
    }

    #[test]
    fn test_zero_page_and_size_are_clamped() {
        let request = PageRequest { page: 0, size: 0 };
        assert_eq!(request.offset(), 0);

        let page = paginate(vec![1, 2, 3], PageRequest { page: 0, size: 10 });
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.page, 1);

        let page = paginate(vec![1, 2, 3], PageRequest { page: 2, size: 0 });
        assert_eq!(page.items, vec![2]);
        assert_eq!(page.size, 1);
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(5, 10));

        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_pages_cover_every_item_once() {
        let items: Vec<u32> = (0..23).collect();
        let size = 4;
        let mut seen = Vec::new();

        for page in 1..=7 {
            let chunk = paginate(items.clone(), PageRequest::new(page, size));
            assert!(chunk.items.len() <= size);
            seen.extend(chunk.items);
        }

        assert_eq!(seen, items);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(usize::MAX, usize::MAX));
        assert!(page.items.is_empty());
    }
}
