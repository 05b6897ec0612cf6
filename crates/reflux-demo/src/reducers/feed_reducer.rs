//! Feed Reducer
//!
//! Tracks the search input, the settled query and the paged result list.

use crate::actions::FeedAction;
use crate::state::FeedState;
use reflux::{Merge, PaginatorAction, Reducible};
use std::collections::HashSet;

pub fn reduce_feed(state: &mut FeedState, action: &FeedAction) {
    match action {
        FeedAction::QueryChanged(input) => {
            state.input = input.clone();
        }
        FeedAction::Search(query) => {
            state.query = query.clone();
            state.last_error = None;
            let initial = state.paginator.initial_page();
            state.paginator.reduce(&PaginatorAction::LoadPage(initial));
        }
        FeedAction::Paging(paging) => {
            state.paginator.reduce(paging);
        }
        FeedAction::DidLoadPage(items) => {
            let ids: Vec<u64> = items.iter().map(|item| item.id).collect();
            for item in items {
                let merged = match state.entities.remove(&item.id) {
                    Some(known) => item.clone().merge(known),
                    None => item.clone(),
                };
                state.entities.insert(merged.id, merged);
            }
            state.paginator.reduce(&PaginatorAction::DidLoadItems(ids));

            // A reloaded first page replaces the list; forget entries it dropped
            let listed: HashSet<u64> = state.paginator.items().iter().copied().collect();
            state.entities.retain(|id, _| listed.contains(id));
        }
    }
}
