//! Auxiliary label poll.
//!
//! Labels change rarely but cheaply, so they poll on a shorter period than
//! items (see the polling config). The fetched set feeds the filter's
//! selectable label chips.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::remote::{ItemFetcher, Label};

use super::poller::PollTask;

/// Current set of repository labels, with change notification.
pub struct LabelStore {
    labels: watch::Sender<Vec<Label>>,
}

impl Default for LabelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelStore {
    pub fn new() -> Self {
        let (labels, _) = watch::channel(Vec::new());
        LabelStore { labels }
    }

    /// Replace the label set. Subscribers are only notified when the set
    /// actually changed.
    pub fn set(&self, labels: Vec<Label>) {
        self.labels.send_if_modified(|current| {
            if *current != labels {
                *current = labels;
                true
            } else {
                false
            }
        });
    }

    pub fn current(&self) -> Vec<Label> {
        self.labels.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Label>> {
        self.labels.subscribe()
    }
}

/// Poll task that refreshes the label store.
pub struct LabelSync {
    fetcher: Arc<dyn ItemFetcher>,
    store: Arc<LabelStore>,
}

impl LabelSync {
    pub fn new(fetcher: Arc<dyn ItemFetcher>, store: Arc<LabelStore>) -> Self {
        LabelSync { fetcher, store }
    }

    pub fn store(&self) -> &Arc<LabelStore> {
        &self.store
    }
}

#[async_trait]
impl PollTask for LabelSync {
    fn is_initial(&self) -> bool {
        self.store.is_empty()
    }

    async fn run(&self) -> Result<()> {
        let labels = self.fetcher.fetch_labels().await?;
        self.store.set(labels);
        Ok(())
    }
}
