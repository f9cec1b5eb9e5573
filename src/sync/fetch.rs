//! Paged fetch with a per-page fallback cache.
//!
//! Every successfully fetched page is remembered. The cache backs two
//! degradation paths: a page the transport reports as unchanged but
//! supplies no body for contributes its last-known items, and a page whose
//! fetch fails outright is substituted with its last-known copy so one
//! broken page does not abort the whole cycle.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::Result;
use crate::remote::ItemFetcher;
use crate::types::Item;

/// Last successfully fetched copy of each page.
pub struct PageCache {
    pages: Mutex<HashMap<u32, Vec<Item>>>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    pub fn new() -> Self {
        PageCache {
            pages: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, page: u32) -> Option<Vec<Item>> {
        self.pages.lock().get(&page).cloned()
    }

    pub fn put(&self, page: u32, items: Vec<Item>) {
        self.pages.lock().insert(page, items);
    }

    /// Highest page number held in the cache.
    pub fn max_page(&self) -> Option<u32> {
        self.pages.lock().keys().max().copied()
    }

    /// Drop cached pages beyond the collection's current page count.
    pub fn truncate_beyond(&self, last_page: u32) {
        self.pages.lock().retain(|page, _| *page <= last_page);
    }

    pub fn clear(&self) {
        self.pages.lock().clear();
    }
}

/// Items contributed by one full fetch pass.
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    pub items: Vec<Item>,
    /// Pages whose fetch failed and whose last-known copy was served instead.
    pub substituted_pages: Vec<u32>,
}

/// Fetch every page of the collection, substituting the last-known copy
/// for pages that fail.
///
/// A failing page with no cached copy fails the whole cycle: without it
/// the fetched id set would be missing a page's worth of items and the
/// reconciler would purge them.
pub async fn fetch_all_pages(fetcher: &dyn ItemFetcher, cache: &PageCache) -> Result<FetchResult> {
    let mut items = Vec::new();
    let mut substituted_pages = Vec::new();
    let mut page = 1u32;
    let mut total_pages = 1u32;

    loop {
        match fetcher.fetch_page(page).await {
            Ok(fetched) => {
                total_pages = total_pages.max(fetched.total_pages).max(1);
                if fetched.is_cached && fetched.items.is_empty() {
                    // Unchanged page with no body: contribute our last-known
                    // copy, or nothing on the first-ever fetch of this page.
                    if let Some(known) = cache.get(page) {
                        items.extend(known);
                    }
                } else {
                    cache.put(page, fetched.items.clone());
                    items.extend(fetched.items);
                }
            }
            Err(e) => match cache.get(page) {
                Some(known) => {
                    tracing::warn!("page {page} fetch failed, serving last known copy: {e}");
                    substituted_pages.push(page);
                    items.extend(known);
                    // The failed response carries no page count; keep
                    // iterating over every page we have ever seen.
                    total_pages = total_pages.max(cache.max_page().unwrap_or(1));
                }
                None => return Err(e),
            },
        }

        if page >= total_pages {
            break;
        }
        page += 1;
    }

    // A shrunk collection leaves orphaned cache entries behind; drop them
    // so a later failure cannot resurrect pages the remote no longer has.
    cache.truncate_beyond(total_pages);

    Ok(FetchResult {
        items,
        substituted_pages,
    })
}
