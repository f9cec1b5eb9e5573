//! Paging of filtered and sorted item lists.

use tokio::sync::watch;

use crate::types::Item;

/// Slices a presentation sequence into pages and self-corrects the page
/// index when it points past the end of the data.
///
/// Reconciliation can delete items out from under the current page. When
/// the requested page comes back empty, the index walks back one page at a
/// time until a non-empty page is found or it reaches zero, so the user is
/// never left on a phantom page even after several full pages disappear in
/// one cycle.
pub struct Paginator {
    page_index: usize,
    page_size: usize,
    total: watch::Sender<usize>,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        let (total, _) = watch::channel(0);
        Paginator {
            page_index: 0,
            page_size,
            total,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
    }

    /// Observable total length of the most recently paginated data.
    /// Consumers use this to render page controls.
    pub fn total_length(&self) -> watch::Receiver<usize> {
        self.total.subscribe()
    }

    /// Return the current page's slice of `data`, publishing the total
    /// length first and self-correcting the page index if it is out of
    /// range.
    pub fn paginate(&mut self, data: &[Item]) -> Vec<Item> {
        self.total.send_replace(data.len());
        loop {
            let slice = page_slice(self.page_index, self.page_size, data);
            if !slice.is_empty() || self.page_index == 0 {
                return slice;
            }
            self.page_index -= 1;
        }
    }
}

/// The slice of `data` for one page, without any index correction.
pub fn page_slice(page_index: usize, page_size: usize, data: &[Item]) -> Vec<Item> {
    let Some(start) = page_index.checked_mul(page_size) else {
        return Vec::new();
    };
    if start >= data.len() {
        return Vec::new();
    }
    let end = (start + page_size).min(data.len());
    data[start..end].to_vec()
}
