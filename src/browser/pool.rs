/// Open tabs of one browser, in opening order, plus which one is active.
#[derive(Debug)]
pub struct TabPool<T> {
    tabs: Vec<T>,
    active_index: usize,
}

impl<T> TabPool<T> {
    pub fn new(initial: T) -> Self {
        Self {
            tabs: vec![initial],
            active_index: 0,
        }
    }

    pub fn active(&self) -> Option<&T> {
        self.tabs.get(self.active_index)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Append a tab and make it active.
    pub fn add(&mut self, tab: T) -> usize {
        self.tabs.push(tab);
        self.active_index = self.tabs.len() - 1;
        self.active_index
    }

    pub fn select(&mut self, index: usize) -> Option<&T> {
        if index < self.tabs.len() {
            self.active_index = index;
            self.tabs.get(index)
        } else {
            None
        }
    }

    /// Remove the tab at `index`.
    ///
    /// Closing the active tab activates the one that took its place, or the
    /// previous one when it was last. Closing another tab keeps the active
    /// tab active.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(index);
        if index < self.active_index {
            self.active_index -= 1;
        } else if self.active_index >= self.tabs.len() {
            self.active_index = self.tabs.len().saturating_sub(1);
        }
        Some(tab)
    }

    /// Remove every tab except the active one.
    pub fn retain_active(&mut self) -> Vec<T> {
        if self.tabs.is_empty() {
            return Vec::new();
        }
        let active = self.tabs.remove(self.active_index);
        let others = std::mem::replace(&mut self.tabs, vec![active]);
        self.active_index = 0;
        others
    }

    pub fn tabs(&self) -> &[T] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(tabs: &[&'static str], active: usize) -> TabPool<&'static str> {
        let mut pool = TabPool::new(tabs[0]);
        for tab in &tabs[1..] {
            pool.add(*tab);
        }
        pool.select(active);
        pool
    }

    #[test]
    fn test_add_activates_new_tab() {
        let mut pool = TabPool::new("a");
        assert_eq!(pool.add("b"), 1);
        assert_eq!(pool.active(), Some(&"b"));
    }

    #[test]
    fn test_closing_active_tab_moves_to_next() {
        let mut pool = pool(&["a", "b", "c"], 1);
        assert_eq!(pool.remove(1), Some("b"));
        assert_eq!(pool.active(), Some(&"c"));
    }

    #[test]
    fn test_closing_last_active_tab_moves_to_previous() {
        let mut pool = pool(&["a", "b", "c"], 2);
        pool.remove(2);
        assert_eq!(pool.active(), Some(&"b"));
    }

    #[test]
    fn test_closing_other_tab_keeps_active() {
        let mut pool = pool(&["a", "b", "c"], 2);
        pool.remove(0);
        assert_eq!(pool.active(), Some(&"c"));
        assert_eq!(pool.active_index(), 1);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut pool = pool(&["a", "b"], 0);
        assert!(pool.select(5).is_none());
        assert_eq!(pool.active(), Some(&"a"));
        assert!(pool.remove(9).is_none());
    }

    #[test]
    fn test_retain_active() {
        let mut pool = pool(&["a", "b", "c"], 1);
        assert_eq!(pool.retain_active(), vec!["a", "c"]);
        assert_eq!(pool.tabs(), &["b"]);
        assert_eq!(pool.active(), Some(&"b"));
    }

    #[test]
    fn test_closing_only_tab_empties_pool() {
        let mut pool = TabPool::new("a");
        pool.remove(0);
        assert!(pool.is_empty());
        assert_eq!(pool.active(), None);
    }
}
