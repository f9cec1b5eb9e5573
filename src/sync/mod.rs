//! Incremental synchronization of the local mirror.
//!
//! One reconciliation cycle fetches every page of the remote collection,
//! diffs the fetched id set against the store's current keys, and applies
//! the upserts and removals as a single batch. Deletions on the remote
//! side (or items falling out of the API-level filter scope) propagate
//! locally through the removal half of the diff.

pub mod fetch;
pub mod labels;
pub mod poller;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::remote::ItemFetcher;
use crate::store::ItemStore;

use fetch::PageCache;
use poller::PollTask;

/// Keys present in the previous store state but absent from the most
/// recent successful fetch. These are the entries to purge.
pub fn stale_ids(previous: &HashSet<u64>, fetched: &HashSet<u64>) -> Vec<u64> {
    previous.difference(fetched).copied().collect()
}

/// What one reconciliation cycle did.
#[derive(Debug, Clone, Default)]
pub struct CycleOutcome {
    /// Items contributed by the fetch, across all pages.
    pub fetched: usize,
    /// Entries purged because they were absent from the fetched set.
    pub removed: usize,
    /// Pages served from the last-known cache because their fetch failed.
    /// Non-empty means the applied data is partially stale.
    pub substituted_pages: Vec<u32>,
    /// False when the cycle produced zero items and the diff was skipped.
    pub reconciled: bool,
}

/// Drives fetch-and-reconcile cycles for one repository's item store.
pub struct SyncEngine {
    fetcher: Arc<dyn ItemFetcher>,
    store: Arc<ItemStore>,
    pages: PageCache,
}

impl SyncEngine {
    pub fn new(fetcher: Arc<dyn ItemFetcher>, store: Arc<ItemStore>) -> Self {
        SyncEngine {
            fetcher,
            store,
            pages: PageCache::new(),
        }
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    /// Drop all mirrored state: the store's entries and the per-page
    /// fallback cache. Used on logout or repository switch, so the next
    /// cycle starts from nothing instead of reconciling against the old
    /// repository's items.
    pub fn reset(&self) {
        self.pages.clear();
        self.store.clear();
    }

    /// Run one fetch-and-reconcile cycle.
    ///
    /// A cycle that contributes zero items carries no information (the
    /// transport's conditional requests short-circuited), so the diff is
    /// skipped entirely rather than read as "the remote is now empty".
    /// On the very first cycle the store has no previous keys and the diff
    /// removes nothing.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let fetched = fetch::fetch_all_pages(self.fetcher.as_ref(), &self.pages).await?;

        if fetched.items.is_empty() {
            return Ok(CycleOutcome {
                fetched: 0,
                removed: 0,
                substituted_pages: fetched.substituted_pages,
                reconciled: false,
            });
        }

        let fetched_ids: HashSet<u64> = fetched.items.iter().map(|item| item.id).collect();
        let previous = self.store.ids();
        let stale = stale_ids(&previous, &fetched_ids);

        let outcome = CycleOutcome {
            fetched: fetched.items.len(),
            removed: stale.len(),
            substituted_pages: fetched.substituted_pages,
            reconciled: true,
        };

        // Upserts and removals from one cycle land as a single batch, so
        // subscribers observe one notification and no intermediate state.
        self.store.apply_batch(fetched.items, &stale);

        Ok(outcome)
    }
}

#[async_trait]
impl PollTask for SyncEngine {
    fn is_initial(&self) -> bool {
        self.store.is_empty()
    }

    async fn run(&self) -> Result<()> {
        let outcome = self.run_cycle().await?;
        if !outcome.substituted_pages.is_empty() {
            tracing::warn!(
                "cycle applied stale data for pages {:?}",
                outcome.substituted_pages
            );
        }
        tracing::debug!(
            fetched = outcome.fetched,
            removed = outcome.removed,
            reconciled = outcome.reconciled,
            "reconciliation cycle finished"
        );
        Ok(())
    }
}
