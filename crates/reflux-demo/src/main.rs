use anyhow::Context;
use reflux::cache::{FileStore, KeyValueStore};
use reflux::{
    action_group, ActionGroup, Debouncer, Dispatcher, Hook, LogActionLogger, LogFilter,
    PaginatorAction, Store,
};
use reflux_config::{LogFilterKind, StoreConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

mod actions;
mod backend;
mod logger;
mod middleware;
mod reducers;
mod state;

use actions::{Action, FeedAction};
use backend::FakeFeedBackend;
use middleware::{open_settings, FeedEnvironment, FeedMiddleware, Settings, SettingsMiddleware};
use state::AppState;

const FEED_SIZE: u64 = 120;
const BACKEND_LATENCY: Duration = Duration::from_millis(40);
const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(60);
const PAGING_TIMEOUT: Duration = Duration::from_secs(30);
const QUERIES: [&str; 3] = ["rust", "tokio", "serde"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_file = logger::init()?;
    log::info!("Starting reflux-demo, logging to {}", log_file.display());

    let config = StoreConfig::load();
    let cache_dir = config.resolved_cache_dir()?;
    let cache: Arc<dyn KeyValueStore> = Arc::new(
        FileStore::new(&cache_dir)
            .with_context(|| format!("Failed to open cache directory {}", cache_dir.display()))?,
    );
    let settings = open_settings(cache, config.cache_debounce());
    let restored = settings.get();

    let store = Store::new(AppState::new(config.initial_page, config.page_size));
    if config.log_actions {
        store.set_logger(LogActionLogger, log_filters(config.log_filter));
    }
    store
        .subscribe_with::<FeedMiddleware>(FeedEnvironment {
            backend: Arc::new(FakeFeedBackend::new(FEED_SIZE, BACKEND_LATENCY)),
        })
        .await?;
    store.subscribe_with::<SettingsMiddleware>(settings).await?;
    store
        .add_hook(Hook::once(
            "feed-complete",
            |s: &AppState| s.feed.paginator.is_last_page(),
            |s: &AppState, _: &Dispatcher<Action>| {
                log::info!(
                    "Feed complete: {} item(s) for '{}'",
                    s.feed.paginator.items().len(),
                    s.feed.query
                );
            },
        ))
        .await?;

    let restore: ActionGroup<Action> = action_group![
        Action::SetOffline(false),
        (!restored.last_query.is_empty())
            .then(|| Action::from(FeedAction::QueryChanged(restored.last_query.clone()))),
    ];
    store.dispatch_group(restore);

    let query = type_query(&store, next_query(&restored), config.input_debounce()).await?;
    let state = tokio::time::timeout(PAGING_TIMEOUT, page_through(&store, query))
        .await
        .context("Timed out while paging")??;

    println!(
        "'{}': {} item(s) on {} page(s)",
        state.feed.query,
        state.feed.paginator.items().len(),
        state.feed.paginator.page().number()
    );
    for item in state.feed.visible().take(5) {
        println!(
            "  #{:<4} {} ({})",
            item.id,
            item.title,
            item.summary.as_deref().unwrap_or("no summary")
        );
    }

    log::debug!("Final input '{}'", state.feed.input);

    store.shutdown().await?;
    log::info!("Exiting reflux-demo");
    Ok(())
}

fn log_filters(kind: LogFilterKind) -> Vec<LogFilter<Action>> {
    match kind {
        LogFilterKind::All => Vec::new(),
        LogFilterKind::DebugOnly => vec![LogFilter::debug_only()],
        LogFilterKind::ErrorsOnly => vec![LogFilter::errors_only()],
    }
}

/// Rotate through the sample queries across runs
fn next_query(settings: &Settings) -> &'static str {
    QUERIES[(settings.searches as usize) % QUERIES.len()]
}

/// Simulate typing `query` one keystroke at a time; resolves with the settled value
async fn type_query(
    store: &Store<AppState>,
    query: &str,
    settle: Duration,
) -> anyhow::Result<String> {
    let input = Debouncer::new(settle);
    let mut settled = input.subscribe();

    for end in 1..=query.len() {
        let text = query[..end].to_string();
        store.dispatch(FeedAction::QueryChanged(text.clone()).into());
        input.receive(text);
        tokio::time::sleep(KEYSTROKE_INTERVAL).await;
    }

    let query = settled.recv().await.context("Input stream closed")?;
    log::info!("Search settled on '{}'", query);
    Ok(query)
}

/// Search for `query` and request pages until the paginator reaches its last page
async fn page_through(store: &Store<AppState>, query: String) -> anyhow::Result<Arc<AppState>> {
    let mut events = store.observe();
    store.dispatch(FeedAction::Search(query).into());

    loop {
        let published = match events.recv().await {
            Ok(published) => published,
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Observer lagged, skipped {} publication(s)", skipped);
                continue;
            }
            Err(RecvError::Closed) => anyhow::bail!("Store stopped while paging"),
        };

        let paginator = &published.state.feed.paginator;
        match &published.action {
            Action::Feed(FeedAction::DidLoadPage(_)) if paginator.is_last_page() => {
                return Ok(Arc::clone(&published.state));
            }
            Action::Feed(FeedAction::DidLoadPage(_)) if paginator.can_load_more() => {
                store.dispatch(FeedAction::Paging(PaginatorAction::LoadNextPage).into());
            }
            Action::Feed(FeedAction::Paging(PaginatorAction::LoadFailed)) => {
                let error = published.state.feed.last_error.clone().unwrap_or_default();
                anyhow::bail!("Paging failed: {}", error);
            }
            _ => {}
        }
    }
}
