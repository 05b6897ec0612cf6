//! Feed Middleware
//!
//! Turns paging actions into backend fetches.
//!
//! # Flow
//!
//! - `Search` (settled query) cancels the fetch in flight and loads the initial page
//! - `LoadPage` / `LoadNextPage` load whatever page the paginator moved to
//! - A failed fetch becomes `LoadFailed`, a cancelled one `LoadCancelled`
//!
//! All fetches share one cancel key, so at most one page is in flight.
//! The middleware is suspended while the app is offline.

use crate::actions::{Action, FeedAction};
use crate::backend::FeedBackend;
use crate::state::AppState;
use reflux::{
    CancelKey, Dispatcher, Effect, EffectId, EffectRunner, FromStore, Middleware,
    MiddlewareStatus, PaginatorAction, SystemAction,
};
use std::sync::Arc;

pub const FEED_KEY: &str = "feed";

/// Runtime dependencies of the feed middleware
#[derive(Clone)]
pub struct FeedEnvironment {
    pub backend: Arc<dyn FeedBackend>,
}

pub struct FeedMiddleware {
    runner: EffectRunner<Action>,
    backend: Arc<dyn FeedBackend>,
    /// The fetch whose failure should roll the paginator back
    in_flight: Option<EffectId>,
}

impl FeedMiddleware {
    fn fetch_current_page(&mut self, state: &AppState) {
        let paginator = &state.feed.paginator;
        if !paginator.is_loading() {
            return;
        }

        let backend = Arc::clone(&self.backend);
        let query = state.feed.query.clone();
        let page = paginator.page().number();
        let per_page = paginator.per_page();

        let effect = Effect::new(async move { backend.fetch_page(&query, page, per_page).await });
        let id = effect.id();
        if self
            .runner
            .execute_map(effect, FEED_KEY, |items| FeedAction::DidLoadPage(items).into())
        {
            log::info!("FeedMiddleware: loading page {} for '{}'", page, state.feed.query);
            self.in_flight = Some(id);
        }
    }

    fn dispatch(&self, action: FeedAction) {
        self.runner.dispatcher().dispatch(action.into());
    }
}

impl Middleware<AppState> for FeedMiddleware {
    fn status(&self, state: &AppState) -> MiddlewareStatus {
        if state.offline {
            MiddlewareStatus::Suspended
        } else {
            MiddlewareStatus::Active
        }
    }

    fn reduce(&mut self, action: &Action, state: &AppState) {
        match action {
            Action::Feed(FeedAction::Search(_)) => {
                if self.runner.cancel(FEED_KEY) {
                    log::debug!("FeedMiddleware: superseded fetch cancelled");
                }
                self.fetch_current_page(state);
            }
            Action::Feed(FeedAction::Paging(
                PaginatorAction::LoadPage(_) | PaginatorAction::LoadNextPage,
            )) => {
                self.fetch_current_page(state);
            }
            Action::Feed(FeedAction::DidLoadPage(_)) => {
                self.in_flight = None;
            }
            Action::System(SystemAction::Error { error, id }) if self.in_flight == Some(*id) => {
                log::warn!("FeedMiddleware: page load failed: {}", error);
                self.in_flight = None;
                self.dispatch(FeedAction::Paging(PaginatorAction::LoadFailed));
            }
            Action::System(SystemAction::DidCancelEffect { key })
                if *key == CancelKey::from(FEED_KEY) =>
            {
                // A restarted search already owns the key again
                if !self.runner.is_running(FEED_KEY) {
                    self.in_flight = None;
                    self.dispatch(FeedAction::Paging(PaginatorAction::LoadCancelled));
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "FeedMiddleware"
    }
}

impl FromStore<AppState> for FeedMiddleware {
    type Environment = FeedEnvironment;

    fn from_store(dispatcher: Dispatcher<Action>, environment: FeedEnvironment) -> Self {
        Self {
            runner: EffectRunner::new(dispatcher),
            backend: environment.backend,
            in_flight: None,
        }
    }
}

impl Drop for FeedMiddleware {
    fn drop(&mut self) {
        let cancelled = self.runner.cancel_all();
        if cancelled > 0 {
            log::debug!("FeedMiddleware: cancelled {} fetch(es) on shutdown", cancelled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FakeFeedBackend;
    use crate::state::FeedItem;
    use async_trait::async_trait;
    use reflux::{Page, Store};
    use std::time::Duration;

    struct FailingBackend;

    #[async_trait]
    impl FeedBackend for FailingBackend {
        async fn fetch_page(
            &self,
            _query: &str,
            page: u32,
            _per_page: usize,
        ) -> anyhow::Result<Vec<FeedItem>> {
            if page > 1 {
                anyhow::bail!("rate limited");
            }
            Ok((1..=2).map(|id| FeedItem::new(id, "ok")).collect())
        }
    }

    async fn store_with(backend: Arc<dyn FeedBackend>, page_size: usize) -> Store<AppState> {
        let store = Store::new(AppState::new(1, page_size));
        store
            .subscribe_with::<FeedMiddleware>(FeedEnvironment { backend })
            .await
            .unwrap();
        store
    }

    async fn wait_idle(store: &Store<AppState>) -> Arc<AppState> {
        let mut changes = store.watch();
        let state = tokio::time::timeout(
            Duration::from_secs(60),
            changes.wait_for(|state| !state.feed.paginator.is_loading()),
        )
        .await
        .expect("feed never settled")
        .unwrap();
        Arc::clone(&state)
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_loads_first_page() {
        let backend = Arc::new(FakeFeedBackend::new(45, Duration::from_millis(20)));
        let store = store_with(backend, 20).await;

        store
            .dispatch_and_wait(FeedAction::Search(String::new()).into())
            .await
            .unwrap();
        let state = wait_idle(&store).await;

        assert_eq!(state.feed.paginator.items().len(), 20);
        assert_eq!(state.feed.paginator.page(), Page::Number(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_search_supersedes_running_fetch() {
        let backend = Arc::new(FakeFeedBackend::new(45, Duration::from_secs(1)));
        let store = store_with(backend, 20).await;
        let mut events = store.observe();

        store.dispatch(FeedAction::Search("rust".into()).into());
        store
            .dispatch_and_wait(FeedAction::Search("tokio".into()).into())
            .await
            .unwrap();
        let state = wait_idle(&store).await;

        assert_eq!(state.feed.query, "tokio");
        assert_eq!(state.feed.paginator.items().len(), 9);
        assert!(state.feed.visible().all(|item| item.title.contains("tokio")));

        // The superseded fetch is reported, but does not clear the new load
        let mut cancelled = 0;
        while let Ok(event) = events.try_recv() {
            match event.action {
                Action::System(SystemAction::DidCancelEffect { .. }) => cancelled += 1,
                Action::Feed(FeedAction::Paging(PaginatorAction::LoadCancelled)) => {
                    panic!("restarted search was marked cancelled")
                }
                _ => {}
            }
        }
        assert_eq!(cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_page_rolls_back() {
        let store = store_with(Arc::new(FailingBackend), 2).await;

        store
            .dispatch_and_wait(FeedAction::Search(String::new()).into())
            .await
            .unwrap();
        wait_idle(&store).await;
        store
            .dispatch_and_wait(FeedAction::Paging(PaginatorAction::LoadNextPage).into())
            .await
            .unwrap();
        let state = wait_idle(&store).await;

        assert_eq!(state.feed.paginator.page(), Page::Number(1));
        assert_eq!(state.feed.last_error.as_deref(), Some("rate limited"));
        assert_eq!(state.feed.paginator.items(), [1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_suspends_fetching() {
        let backend = Arc::new(FakeFeedBackend::new(45, Duration::from_millis(20)));
        let store = store_with(backend, 20).await;

        store.dispatch_and_wait(Action::SetOffline(true)).await.unwrap();
        store
            .dispatch_and_wait(FeedAction::Search(String::new()).into())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = store.state();
        assert!(state.feed.paginator.is_loading());
        assert!(state.feed.paginator.items().is_empty());
    }
}
