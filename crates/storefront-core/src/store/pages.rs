use crate::model::PageMeta;

/// One page as the server reported it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Accumulated pages of a paginated read, in cursor order.
#[derive(Debug, Clone)]
pub struct Pages<T> {
    pages: Vec<Page<T>>,
}

impl<T> Default for Pages<T> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<T: Clone> Pages<T> {
    pub fn first(page: Page<T>) -> Self {
        Self { pages: vec![page] }
    }

    /// Cursor for the next request: `current_page + 1` while the last page
    /// reports `current_page < total_pages`, otherwise `None`.
    pub fn next_cursor(&self) -> Option<u32> {
        let meta = self.pages.last()?.meta;
        (meta.current_page < meta.total_pages).then(|| meta.current_page + 1)
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor().is_some()
    }

    /// A copy with `page` appended. Cached snapshots are never edited in place.
    #[must_use]
    pub fn appended(&self, page: Page<T>) -> Self {
        let mut pages = self.pages.clone();
        pages.push(page);
        Self { pages }
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All items across pages, flattened.
    pub fn items(&self) -> Vec<T> {
        self.pages
            .iter()
            .flat_map(|p| p.items.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(current: u32, total: u32) -> Page<u32> {
        Page {
            items: vec![current],
            meta: PageMeta {
                current_page: current,
                total_pages: total,
                total_items: None,
                limit: Some(20),
            },
        }
    }

    #[test]
    fn cursor_advances_until_last_page() {
        let pages = Pages::first(page(1, 3));
        assert_eq!(pages.next_cursor(), Some(2));

        let pages = pages.appended(page(2, 3));
        assert_eq!(pages.next_cursor(), Some(3));

        let pages = pages.appended(page(3, 3));
        assert_eq!(pages.next_cursor(), None);
        assert!(!pages.has_more());
        assert_eq!(pages.items(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_result_has_no_next_page() {
        assert_eq!(Pages::first(page(1, 0)).next_cursor(), None);
        assert_eq!(Pages::<u32>::default().next_cursor(), None);
    }
}
