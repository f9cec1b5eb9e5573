//! Per-view wiring of the presentation pipeline.
//!
//! An [`ItemListView`] subscribes to one store's snapshot stream and
//! republishes the filtered, sorted, paginated slice on a watch channel.
//! Any number of views can hang off the same store, each with its own
//! filter and pagination state.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, watch};

use crate::filter::{Filter, SearchColumn, apply_filter};
use crate::paginate::Paginator;
use crate::sort::sort_items;
use crate::store::ItemStore;
use crate::types::Item;

/// One view over a store: current filter, pagination state, and the
/// resulting item-list stream.
pub struct ItemListView {
    store: Arc<ItemStore>,
    filter: RwLock<Filter>,
    paginator: Mutex<Paginator>,
    columns: Vec<SearchColumn>,
    out: watch::Sender<Vec<Item>>,
}

impl ItemListView {
    /// Create a view over `store` searching the given columns, and spawn
    /// the background task that recomputes it on every store change.
    pub fn spawn(store: Arc<ItemStore>, columns: Vec<SearchColumn>) -> Arc<Self> {
        let filter = Filter::default();
        let paginator = Paginator::new(filter.items_per_page);

        // Subscribe before the initial compute so no snapshot can slip
        // between the two.
        let rx = store.subscribe();

        let view = Arc::new(ItemListView {
            store: store.clone(),
            filter: RwLock::new(filter),
            paginator: Mutex::new(paginator),
            columns,
            out: watch::channel(Vec::new()).0,
        });
        view.recompute(store.snapshot());

        let weak = Arc::downgrade(&view);
        tokio::spawn(async move {
            run_view_loop(weak, rx).await;
        });

        view
    }

    /// The current filter value.
    pub fn filter(&self) -> Filter {
        self.filter.read().clone()
    }

    /// Replace the whole filter value. Callers read-modify-write through
    /// [`Filter::clone_with`]; there is no partial patch.
    pub fn replace_filter(&self, filter: Filter) {
        {
            let mut paginator = self.paginator.lock();
            paginator.set_page_size(filter.items_per_page);
        }
        *self.filter.write() = filter;
        self.recompute(self.store.snapshot());
    }

    pub fn page_index(&self) -> usize {
        self.paginator.lock().page_index()
    }

    pub fn set_page_index(&self, page_index: usize) {
        self.paginator.lock().set_page_index(page_index);
        self.recompute(self.store.snapshot());
    }

    pub fn page_size(&self) -> usize {
        self.paginator.lock().page_size()
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.paginator.lock().set_page_size(page_size);
        self.recompute(self.store.snapshot());
    }

    /// Observable total length of the filtered data, for page controls.
    pub fn total_length(&self) -> watch::Receiver<usize> {
        self.paginator.lock().total_length()
    }

    /// Subscribe to the view's current page of items.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Item>> {
        self.out.subscribe()
    }

    /// The view's current page of items.
    pub fn current(&self) -> Vec<Item> {
        self.out.borrow().clone()
    }

    fn recompute(&self, snapshot: Vec<Item>) {
        let filter = self.filter.read().clone();
        let mut items = apply_filter(&filter, &self.columns, snapshot);
        sort_items(&mut items, filter.sort);
        let page = self.paginator.lock().paginate(&items);
        self.out.send_replace(page);
    }
}

async fn run_view_loop(
    view: std::sync::Weak<ItemListView>,
    mut rx: broadcast::Receiver<Vec<Item>>,
) {
    loop {
        match rx.recv().await {
            Ok(snapshot) => {
                let Some(view) = view.upgrade() else { break };
                view.recompute(snapshot);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("view lagged {skipped} snapshots behind, re-reading store");
                let Some(view) = view.upgrade() else { break };
                view.recompute(view.store.snapshot());
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
