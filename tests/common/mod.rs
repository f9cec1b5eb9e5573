//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use spyglass::{
    FetchedPage, Item, ItemFetcher, ItemKind, ItemState, Label, Milestone, Result, User,
};

/// Build a minimal item for pipeline tests.
pub fn make_item(id: u64, title: &str, state: ItemState, kind: ItemKind) -> Item {
    Item {
        id,
        global_id: format!("node-{id}"),
        title: title.to_string(),
        description: "No details provided.".to_string(),
        state,
        state_reason: None,
        kind,
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-02T00:00:00Z".to_string(),
        closed_at: None,
        author: "alice".to_string(),
        assignees: vec![],
        labels: vec![],
        milestone: Milestone::sentinel_for(kind).clone(),
        is_draft: false,
        review_decision: None,
        reviews: vec![],
    }
}

/// Attach a milestone title to an item.
pub fn with_milestone(mut item: Item, title: &str) -> Item {
    item.milestone = Milestone::new(title, Some("open".to_string()));
    item
}

pub fn ids(items: &[Item]) -> Vec<u64> {
    items.iter().map(|i| i.id).collect()
}

/// Programmable fetcher backing sync and poller tests.
///
/// Pages are replaced wholesale between cycles with `set_pages`. Every
/// `fetch_page` call is counted, and the high-water mark of concurrently
/// in-flight calls is recorded for overlap assertions.
pub struct MockFetcher {
    pages: Mutex<Vec<Vec<Item>>>,
    delay: Mutex<Duration>,
    pub page_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new(pages: Vec<Vec<Item>>) -> Arc<Self> {
        Arc::new(MockFetcher {
            pages: Mutex::new(pages),
            delay: Mutex::new(Duration::ZERO),
            page_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    /// Replace the remote's contents for subsequent cycles.
    pub fn set_pages(&self, pages: Vec<Vec<Item>>) {
        *self.pages.lock() = pages;
    }

    /// Make every page fetch take this long.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }
}

#[async_trait]
impl ItemFetcher for MockFetcher {
    async fn fetch_page(&self, page: u32) -> Result<FetchedPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let pages = self.pages.lock().clone();
        let total_pages = pages.len().max(1) as u32;
        let items = pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default();

        Ok(FetchedPage {
            items,
            is_cached: false,
            total_pages,
        })
    }

    async fn fetch_assignable_users(&self) -> Result<Vec<User>> {
        Ok(vec![])
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>> {
        Ok(vec![])
    }
}

/// Fetcher that always reports "unchanged" with no body, as a transport
/// cache short-circuit would.
pub struct NotModifiedFetcher;

#[async_trait]
impl ItemFetcher for NotModifiedFetcher {
    async fn fetch_page(&self, _page: u32) -> Result<FetchedPage> {
        Ok(FetchedPage {
            items: vec![],
            is_cached: true,
            total_pages: 1,
        })
    }

    async fn fetch_assignable_users(&self) -> Result<Vec<User>> {
        Ok(vec![])
    }

    async fn fetch_labels(&self) -> Result<Vec<Label>> {
        Ok(vec![])
    }
}
