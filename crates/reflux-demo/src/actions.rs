//! Actions represent all possible state changes in the demo.
//! Actions are grouped by scope to indicate which part of the app they affect.

use crate::state::FeedItem;
use reflux::{PaginatorAction, Priority, SystemAction};
use strum::IntoStaticStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Feed search and paging
    Feed(FeedAction),
    /// Connectivity toggle; the feed middleware is suspended while offline
    SetOffline(bool),
    /// Produced by the effect runner
    System(SystemAction),
}

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum FeedAction {
    /// Raw keystroke-level query text (not yet settled)
    QueryChanged(String),
    /// Settled query: restart paging from the initial page
    Search(String),
    Paging(PaginatorAction<u64>),
    /// One page of results for the page being loaded
    DidLoadPage(Vec<FeedItem>),
}

impl From<SystemAction> for Action {
    fn from(action: SystemAction) -> Self {
        Action::System(action)
    }
}

impl From<FeedAction> for Action {
    fn from(action: FeedAction) -> Self {
        Action::Feed(action)
    }
}

impl reflux::Action for Action {
    fn is_silent(&self) -> bool {
        matches!(self, Action::Feed(FeedAction::QueryChanged(_)))
    }

    fn is_error(&self) -> bool {
        matches!(
            self,
            Action::System(SystemAction::Error { .. })
                | Action::Feed(FeedAction::Paging(PaginatorAction::LoadFailed))
        )
    }

    fn priority(&self) -> Priority {
        match self {
            Action::Feed(FeedAction::Search(_)) => Priority::High,
            Action::Feed(FeedAction::QueryChanged(_)) => Priority::Low,
            _ => Priority::Normal,
        }
    }

    fn describe(&self) -> String {
        match self {
            // Pages can be large; name and size are enough
            Action::Feed(feed @ FeedAction::DidLoadPage(items)) => {
                let name: &'static str = feed.into();
                format!("Feed::{}({} items)", name, items.len())
            }
            Action::Feed(feed) => format!("Feed::{:?}", feed),
            other => format!("{:?}", other),
        }
    }
}
