use crate::actions::Action;
use crate::reducers::feed_reducer;
use crate::state::AppState;
use reflux::SystemAction;

/// Root reducer - forwards each action to the sub-state it concerns
pub fn reduce(state: &mut AppState, action: &Action) {
    match action {
        Action::Feed(feed_action) => feed_reducer::reduce_feed(&mut state.feed, feed_action),
        Action::SetOffline(offline) => {
            log::debug!("Connectivity: {}", if *offline { "offline" } else { "online" });
            state.offline = *offline;
        }
        Action::System(SystemAction::Error { error, .. }) => {
            state.feed.last_error = Some(error.clone());
        }
        Action::System(SystemAction::DidCancelEffect { .. }) => {}
    }
}
