//! Forward-only page cursor with accumulated item identifiers

use crate::state::Reducible;
use std::collections::HashSet;
use std::hash::Hash;

/// Current position of the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Viewing or loading page `n`
    Number(u32),
    /// Page `n` came back short; forward paging is over
    LastPage(u32),
}

impl Page {
    pub fn number(self) -> u32 {
        match self {
            Page::Number(n) | Page::LastPage(n) => n,
        }
    }

    pub fn is_last(self) -> bool {
        matches!(self, Page::LastPage(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorAction<Id> {
    /// Start loading page `n`; the initial page always restarts paging
    LoadPage(u32),
    /// Start loading the page after the current one
    LoadNextPage,
    /// The page being loaded returned these identifiers
    DidLoadItems(Vec<Id>),
    /// The page being loaded failed
    LoadFailed,
    /// The page being loaded was abandoned
    LoadCancelled,
}

/// Paging state machine
///
/// Starts at `Number(initial_page)`, idle. Loading the initial page replaces
/// the item set; later pages append to it. A page shorter than `per_page`
/// moves the cursor to `LastPage`, after which forward loads are ignored until
/// the initial page is requested again.
#[derive(Debug, Clone)]
pub struct Paginator<Id> {
    page: Page,
    loading: bool,
    items: Vec<Id>,
    seen: HashSet<Id>,
    initial_page: u32,
    per_page: usize,
    prefix_keep: bool,
}

impl<Id: Clone + Eq + Hash> Paginator<Id> {
    pub fn new(initial_page: u32, per_page: usize) -> Self {
        Self {
            page: Page::Number(initial_page),
            loading: false,
            items: Vec::new(),
            seen: HashSet::new(),
            initial_page,
            per_page,
            prefix_keep: false,
        }
    }

    /// When the initial page reloads empty, keep the first `per_page` items
    /// instead of clearing the list
    pub fn with_prefix_keep(mut self, prefix_keep: bool) -> Self {
        self.prefix_keep = prefix_keep;
        self
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn items(&self) -> &[Id] {
        &self.items
    }

    pub fn initial_page(&self) -> u32 {
        self.initial_page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_last_page(&self) -> bool {
        self.page.is_last()
    }

    /// Whether a forward load would be accepted right now
    pub fn can_load_more(&self) -> bool {
        !self.loading && !self.page.is_last()
    }

    /// The page a [`PaginatorAction::LoadNextPage`] would request
    pub fn next_page(&self) -> Option<u32> {
        match self.page {
            Page::Number(n) => Some(n + 1),
            Page::LastPage(_) => None,
        }
    }

    fn load_page(&mut self, n: u32) {
        if n == self.initial_page {
            self.page = Page::Number(n);
            self.loading = true;
            return;
        }
        match self.page {
            Page::LastPage(last) => {
                log::debug!("Paginator: ignoring page {} after last page {}", n, last);
            }
            Page::Number(_) => {
                self.page = Page::Number(n.max(self.initial_page));
                self.loading = true;
            }
        }
    }

    fn did_load(&mut self, items: &[Id]) {
        self.loading = false;
        let Page::Number(current) = self.page else {
            log::debug!("Paginator: dropping {} items delivered after last page", items.len());
            return;
        };

        if current == self.initial_page {
            if items.is_empty() && self.prefix_keep {
                self.items.truncate(self.per_page);
                self.seen = self.items.iter().cloned().collect();
            } else {
                self.items.clear();
                self.seen.clear();
                self.append(items);
            }
        } else {
            self.append(items);
        }

        if items.len() < self.per_page {
            self.page = Page::LastPage(current);
        }
    }

    fn append(&mut self, items: &[Id]) {
        for id in items {
            if self.seen.insert(id.clone()) {
                self.items.push(id.clone());
            }
        }
    }

    fn load_aborted(&mut self) {
        if self.loading {
            if let Page::Number(n) = self.page {
                if n > self.initial_page {
                    self.page = Page::Number(n - 1);
                }
            }
        }
        self.loading = false;
    }
}

impl<Id: Clone + Eq + Hash> Reducible for Paginator<Id> {
    type Action = PaginatorAction<Id>;

    fn reduce(&mut self, action: &Self::Action) {
        match action {
            PaginatorAction::LoadPage(n) => self.load_page(*n),
            PaginatorAction::LoadNextPage => {
                if let Some(next) = self.next_page() {
                    self.load_page(next);
                }
            }
            PaginatorAction::DidLoadItems(items) => self.did_load(items),
            PaginatorAction::LoadFailed | PaginatorAction::LoadCancelled => self.load_aborted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce_all(
        paginator: &mut Paginator<&'static str>,
        actions: Vec<PaginatorAction<&'static str>>,
    ) {
        for action in &actions {
            paginator.reduce(action);
        }
    }

    #[test]
    fn test_initial_state() {
        let paginator = Paginator::<u64>::new(1, 20);
        assert_eq!(paginator.page(), Page::Number(1));
        assert!(!paginator.is_loading());
        assert!(paginator.items().is_empty());
        assert!(paginator.can_load_more());
    }

    #[test]
    fn test_end_to_end_paging() {
        let mut paginator = Paginator::new(1, 2);

        paginator.reduce(&PaginatorAction::LoadPage(1));
        assert!(paginator.is_loading());

        paginator.reduce(&PaginatorAction::DidLoadItems(vec!["a", "b"]));
        assert_eq!(paginator.items(), ["a", "b"]);
        assert_eq!(paginator.page(), Page::Number(1));
        assert!(!paginator.is_loading());

        paginator.reduce(&PaginatorAction::LoadPage(2));
        assert!(paginator.is_loading());
        assert_eq!(paginator.page(), Page::Number(2));

        paginator.reduce(&PaginatorAction::DidLoadItems(vec!["c"]));
        assert_eq!(paginator.items(), ["a", "b", "c"]);
        assert_eq!(paginator.page(), Page::LastPage(2));

        paginator.reduce(&PaginatorAction::LoadPage(3));
        assert_eq!(paginator.page(), Page::LastPage(2));
        assert!(!paginator.is_loading());
        assert!(!paginator.can_load_more());
    }

    #[test]
    fn test_error_rolls_back_one_page() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
                PaginatorAction::LoadPage(2),
                PaginatorAction::DidLoadItems(vec!["c", "d"]),
                PaginatorAction::LoadPage(3),
            ],
        );
        assert_eq!(paginator.page(), Page::Number(3));
        assert!(paginator.is_loading());

        paginator.reduce(&PaginatorAction::LoadFailed);

        assert_eq!(paginator.page(), Page::Number(2));
        assert!(!paginator.is_loading());
    }

    #[test]
    fn test_error_on_initial_page_does_not_go_below() {
        let mut paginator = Paginator::<u64>::new(1, 2);
        paginator.reduce(&PaginatorAction::LoadPage(1));
        paginator.reduce(&PaginatorAction::LoadFailed);
        assert_eq!(paginator.page(), Page::Number(1));
        assert!(!paginator.is_loading());
    }

    #[test]
    fn test_error_while_idle_only_clears_flag() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(2),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
                PaginatorAction::LoadFailed,
            ],
        );
        assert_eq!(paginator.page(), Page::Number(2));
    }

    #[test]
    fn test_initial_page_rearms_after_last_page() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a"]),
            ],
        );
        assert_eq!(paginator.page(), Page::LastPage(1));

        paginator.reduce(&PaginatorAction::LoadPage(1));
        assert_eq!(paginator.page(), Page::Number(1));
        assert!(paginator.is_loading());

        paginator.reduce(&PaginatorAction::DidLoadItems(vec!["x", "y"]));
        assert_eq!(paginator.items(), ["x", "y"]);
        assert_eq!(paginator.page(), Page::Number(1));
    }

    #[test]
    fn test_page_never_below_initial() {
        let mut paginator = Paginator::<u64>::new(3, 10);
        paginator.reduce(&PaginatorAction::LoadPage(1));
        assert_eq!(paginator.page(), Page::Number(3));
    }

    #[test]
    fn test_load_next_page() {
        let mut paginator = Paginator::new(0, 1);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(0),
                PaginatorAction::DidLoadItems(vec!["a"]),
                PaginatorAction::LoadNextPage,
            ],
        );
        assert_eq!(paginator.page(), Page::Number(1));
        paginator.reduce(&PaginatorAction::DidLoadItems(vec![]));
        assert_eq!(paginator.page(), Page::LastPage(1));
        assert_eq!(paginator.next_page(), None);
    }

    #[test]
    fn test_duplicate_ids_are_not_appended_twice() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
                PaginatorAction::LoadPage(2),
                PaginatorAction::DidLoadItems(vec!["b", "c"]),
            ],
        );
        assert_eq!(paginator.items(), ["a", "b", "c"]);
        assert_eq!(paginator.page(), Page::Number(2));
    }

    #[test]
    fn test_prefix_keep_on_empty_reload() {
        let mut paginator = Paginator::new(1, 2).with_prefix_keep(true);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
                PaginatorAction::LoadPage(2),
                PaginatorAction::DidLoadItems(vec!["c", "d"]),
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec![]),
            ],
        );
        assert_eq!(paginator.items(), ["a", "b"]);
        assert_eq!(paginator.page(), Page::LastPage(1));
    }

    #[test]
    fn test_empty_reload_without_prefix_keep_clears() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec![]),
            ],
        );
        assert!(paginator.items().is_empty());
    }

    #[test]
    fn test_clone_is_a_snapshot() {
        let mut paginator = Paginator::new(1, 2);
        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadPage(1),
                PaginatorAction::DidLoadItems(vec!["a", "b"]),
            ],
        );
        let snapshot = paginator.clone();

        reduce_all(
            &mut paginator,
            vec![
                PaginatorAction::LoadNextPage,
                PaginatorAction::DidLoadItems(vec!["c"]),
            ],
        );

        assert_eq!(snapshot.items(), ["a", "b"]);
        assert_eq!(snapshot.page(), Page::Number(1));
        assert_eq!(paginator.items(), ["a", "b", "c"]);
        assert!(format!("{:?}", snapshot).contains("Number(1)"));
    }
}
