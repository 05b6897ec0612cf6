use crate::actions::Action;
use reflux::{Merge, Paginator, StoreState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the feed as delivered by the backend
///
/// Listing pages often carry partial entries; fields the backend left out
/// are filled from what the state already knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: u64,
    pub title: String,
    pub summary: Option<String>,
    pub author: Option<String>,
}

impl FeedItem {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            summary: None,
            author: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

impl Merge for FeedItem {
    fn merge(self, incoming: Self) -> Self {
        Self {
            id: self.id,
            title: self.title.merge(incoming.title),
            summary: self.summary.merge(incoming.summary),
            author: self.author.merge(incoming.author),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedState {
    /// What the user is typing right now
    pub input: String,
    /// The settled query the current pages belong to
    pub query: String,
    pub paginator: Paginator<u64>,
    pub entities: BTreeMap<u64, FeedItem>,
    pub last_error: Option<String>,
}

impl FeedState {
    pub fn new(initial_page: u32, page_size: usize) -> Self {
        Self {
            input: String::new(),
            query: String::new(),
            paginator: Paginator::new(initial_page, page_size),
            entities: BTreeMap::new(),
            last_error: None,
        }
    }

    /// Loaded entries in page order
    pub fn visible(&self) -> impl Iterator<Item = &FeedItem> {
        self.paginator
            .items()
            .iter()
            .filter_map(|id| self.entities.get(id))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub feed: FeedState,
    pub offline: bool,
}

impl AppState {
    pub fn new(initial_page: u32, page_size: usize) -> Self {
        Self {
            feed: FeedState::new(initial_page, page_size),
            offline: false,
        }
    }
}

impl StoreState for AppState {
    type Action = Action;

    fn reduce(&mut self, action: &Action) {
        crate::reducers::app_reducer::reduce(self, action);
    }

    fn post_reduce(&self, action: &Action) {
        if let Action::System(reflux::SystemAction::Error { error, id }) = action {
            log::debug!("AppState: {} recorded as last error: {}", id, error);
        }
    }
}
