//! Feed backend
//!
//! The feed middleware only talks to [`FeedBackend`]; the binary wires the
//! in-process [`FakeFeedBackend`], tests wire whatever they need.

use crate::state::FeedItem;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// Fetch one page of entries matching `query` (case-insensitive, empty matches all)
    ///
    /// Pages are 1-indexed. A page past the end is empty, not an error.
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        per_page: usize,
    ) -> anyhow::Result<Vec<FeedItem>>;
}

const TOPICS: [&str; 5] = ["rust", "tokio", "serde", "async", "traits"];

/// Deterministic in-memory feed with simulated latency
pub struct FakeFeedBackend {
    items: Vec<FeedItem>,
    latency: Duration,
}

impl FakeFeedBackend {
    pub fn new(count: u64, latency: Duration) -> Self {
        let items = (1..=count)
            .map(|id| {
                let topic = TOPICS[(id as usize) % TOPICS.len()];
                let item = FeedItem::new(id, format!("Post {} about {}", id, topic))
                    .with_author(format!("author-{}", id % 7));
                // Listings leave the summary out for every third entry
                if id % 3 == 0 {
                    item
                } else {
                    item.with_summary(format!("A few words on {}", topic))
                }
            })
            .collect();
        Self { items, latency }
    }
}

#[async_trait]
impl FeedBackend for FakeFeedBackend {
    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        per_page: usize,
    ) -> anyhow::Result<Vec<FeedItem>> {
        if page == 0 || per_page == 0 {
            anyhow::bail!("invalid page request: page {} with {} per page", page, per_page);
        }
        tokio::time::sleep(self.latency).await;

        let needle = query.to_lowercase();
        let skip = (page as usize - 1) * per_page;
        let items: Vec<FeedItem> = self
            .items
            .iter()
            .filter(|item| needle.is_empty() || item.title.to_lowercase().contains(&needle))
            .skip(skip)
            .take(per_page)
            .cloned()
            .collect();

        log::debug!(
            "FakeFeedBackend: '{}' page {} -> {} item(s)",
            query,
            page,
            items.len()
        );
        Ok(items)
    }
}
