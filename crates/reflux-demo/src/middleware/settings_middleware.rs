//! Settings Middleware
//!
//! Persists user settings through a write-behind [`CacheCell`].
//!
//! - Remembers the last settled search so the next run can restore it
//! - Counts searches across runs
//! - Flushes the pending write when the store shuts down

use crate::actions::{Action, FeedAction};
use crate::state::AppState;
use reflux::cache::{CacheCell, KeyValueStore};
use reflux::{Dispatcher, FromStore, Middleware};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub last_query: String,
    #[serde(default)]
    pub searches: u64,
}

/// Open the persisted settings cell
///
/// Must be called from within a tokio runtime.
pub fn open_settings(backend: Arc<dyn KeyValueStore>, debounce: Duration) -> CacheCell<Settings> {
    CacheCell::new(SETTINGS_KEY, Settings::default(), backend, debounce)
}

pub struct SettingsMiddleware {
    settings: CacheCell<Settings>,
}

impl Middleware<AppState> for SettingsMiddleware {
    fn reduce(&mut self, action: &Action, _state: &AppState) {
        if let Action::Feed(FeedAction::Search(query)) = action {
            self.settings.update(|settings| {
                settings.last_query = query.clone();
                settings.searches += 1;
            });
        }
    }

    fn name(&self) -> &'static str {
        "SettingsMiddleware"
    }
}

impl FromStore<AppState> for SettingsMiddleware {
    type Environment = CacheCell<Settings>;

    fn from_store(_dispatcher: Dispatcher<Action>, settings: CacheCell<Settings>) -> Self {
        Self { settings }
    }
}

impl Drop for SettingsMiddleware {
    fn drop(&mut self) {
        if self.settings.flush() {
            log::debug!("SettingsMiddleware: flushed pending settings on shutdown");
        }
    }
}
