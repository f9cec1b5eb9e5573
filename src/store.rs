//! In-memory store for mirrored items with change notification.
//!
//! The store holds the current mirror of one repository's items in a
//! `DashMap` keyed by display id, allowing lock-free concurrent reads and
//! fine-grained locking for writes. Every mutating batch emits one
//! materialized snapshot of the full collection on a broadcast channel, so
//! consumers filtering or sorting the data can never observe a torn state.

use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::types::Item;

/// Capacity of the snapshot broadcast channel. Slow subscribers that lag
/// behind receive a `Lagged` error and should fall back to [`ItemStore::snapshot`].
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Keyed collection of items for one repository, created once per
/// poll-session and cleared on logout or repository switch.
pub struct ItemStore {
    items: DashMap<u64, Item>,
    snapshots: broadcast::Sender<Vec<Item>>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        ItemStore {
            items: DashMap::new(),
            snapshots,
        }
    }

    /// Insert or overwrite each item by id. Never removes entries not
    /// present in the batch. Emits a snapshot if anything actually changed.
    pub fn upsert_all(&self, items: Vec<Item>) {
        if self.upsert_quiet(items) {
            self.emit();
        }
    }

    /// Delete the listed keys if present; absent keys are a no-op.
    /// Emits a snapshot if anything was actually removed.
    pub fn remove_all(&self, ids: &[u64]) {
        if self.remove_quiet(ids) {
            self.emit();
        }
    }

    /// Apply one reconciliation cycle's upserts and removals as a single
    /// logical update: subscribers observe at most one notification, sent
    /// after both operations have been applied.
    pub fn apply_batch(&self, upserts: Vec<Item>, removals: &[u64]) {
        let upserted = self.upsert_quiet(upserts);
        let removed = self.remove_quiet(removals);
        if upserted || removed {
            self.emit();
        }
    }

    /// Remove every entry. Used on logout or repository switch.
    pub fn clear(&self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.emit();
        }
    }

    /// A fresh materialized array of current values, order unspecified.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.iter().map(|entry| entry.value().clone()).collect()
    }

    /// The set of keys currently present.
    pub fn ids(&self) -> HashSet<u64> {
        self.items.iter().map(|entry| *entry.key()).collect()
    }

    /// Subscribe to full-collection snapshots emitted after each mutating batch.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Item>> {
        self.snapshots.subscribe()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Upsert without emitting. Returns whether any entry actually changed.
    fn upsert_quiet(&self, items: Vec<Item>) -> bool {
        let mut mutated = false;
        for item in items {
            let changed = match self.items.get(&item.id) {
                Some(existing) => *existing != item,
                None => true,
            };
            if changed {
                self.items.insert(item.id, item);
                mutated = true;
            }
        }
        mutated
    }

    /// Remove without emitting. Returns whether any key was present.
    fn remove_quiet(&self, ids: &[u64]) -> bool {
        let mut mutated = false;
        for id in ids {
            if self.items.remove(id).is_some() {
                mutated = true;
            }
        }
        mutated
    }

    fn emit(&self) {
        // No receivers is fine; the snapshot is simply dropped.
        let _ = self.snapshots.send(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemKind, ItemState, Milestone, NO_DESCRIPTION};

    fn item(id: u64, title: &str) -> Item {
        Item {
            id,
            global_id: format!("node-{id}"),
            title: title.to_string(),
            description: NO_DESCRIPTION.to_string(),
            state: ItemState::Open,
            state_reason: None,
            kind: ItemKind::Issue,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-02T00:00:00Z".to_string(),
            closed_at: None,
            author: "alice".to_string(),
            assignees: vec![],
            labels: vec![],
            milestone: Milestone::sentinel_for(ItemKind::Issue).clone(),
            is_draft: false,
            review_decision: None,
            reviews: vec![],
        }
    }

    #[test]
    fn test_upsert_and_snapshot() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "one"), item(2, "two")]);

        assert_eq!(store.len(), 2);
        let mut snapshot = store.snapshot();
        snapshot.sort_by_key(|i| i.id);
        assert_eq!(snapshot[0].title, "one");
        assert_eq!(snapshot[1].title, "two");
    }

    #[test]
    fn test_upsert_overwrites_by_id() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "before")]);
        store.upsert_all(vec![item(1, "after")]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].title, "after");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = ItemStore::new();
        let batch = vec![item(1, "one"), item(2, "two")];
        store.upsert_all(batch.clone());

        let mut first = store.snapshot();
        first.sort_by_key(|i| i.id);

        store.upsert_all(batch);
        let mut second = store.snapshot();
        second.sort_by_key(|i| i.id);

        assert_eq!(first, second);
    }

    #[test]
    fn test_remove_absent_keys_is_noop() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "one")]);
        store.remove_all(&[2, 3]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_emits_single_snapshot() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "one"), item(2, "two")]);

        let mut rx = store.subscribe();
        store.apply_batch(vec![item(3, "three")], &[1]);

        let snapshot = rx.recv().await.expect("one snapshot expected");
        let ids: HashSet<u64> = snapshot.iter().map(|i| i.id).collect();
        assert_eq!(ids, HashSet::from([2, 3]));

        // No second notification for the same batch.
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_no_notification_when_nothing_changes() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "one")]);

        let mut rx = store.subscribe();
        store.upsert_all(vec![item(1, "one")]);
        store.remove_all(&[99]);

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_clear() {
        let store = ItemStore::new();
        store.upsert_all(vec![item(1, "one")]);
        store.clear();
        assert!(store.is_empty());
    }
}
