/// Paged delivery of large result sets.
///
/// The first request for a result set computes it in full, freezes it in
/// a [`PaginationCache`] under a fresh token, and returns the first page
/// with that token. Follow-up requests quote the token and are served by
/// slicing the snapshot.
///
/// Snapshots are point-in-time views: later edits to the underlying
/// documents do not invalidate them. An evicted or unknown token is not an
/// error, it just means the set is recomputed from the language server.
use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Snapshots kept before the least recently used one is evicted.
pub const DEFAULT_CAPACITY: usize = 128;

/// LRU store mapping opaque tokens to frozen result snapshots.
///
/// Entries are written once and only read afterwards, so concurrent
/// readers never observe a partially built snapshot.
pub struct PaginationCache<T> {
    capacity: usize,
    /// Least recently used first.
    entries: Mutex<IndexMap<String, Arc<[T]>>>,
}

impl<T> PaginationCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `payload` under a freshly minted token.
    pub fn put(&self, payload: Vec<T>) -> String {
        self.put_shared(Arc::from(payload))
    }

    fn put_shared(&self, payload: Arc<[T]>) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let mut entries = self.entries.lock();
        entries.insert(token.clone(), payload);
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::trace!(token = %evicted, "evicted pagination snapshot");
            }
        }
        token
    }

    /// Look up a snapshot, marking it most recently used.
    pub fn get(&self, token: &str) -> Option<Arc<[T]>> {
        let mut entries = self.entries.lock();
        let (key, payload) = entries.shift_remove_entry(token)?;
        entries.insert(key, Arc::clone(&payload));
        Some(payload)
    }
}

impl<T> Default for PaginationCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Paging parameters accepted by every paginated capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub start_index: usize,
    /// Page size; `None` (or `0`) returns everything from `start_index` on.
    pub max_items: Option<usize>,
    /// Token from a previous page of the same result set.
    pub pagination_id: Option<String>,
}

impl PageRequest {
    pub fn first(max_items: usize) -> Self {
        Self {
            start_index: 0,
            max_items: Some(max_items),
            pagination_id: None,
        }
    }

    /// The request for the page following `page`.
    pub fn next_after<T>(&self, page: &Page<T>) -> Option<Self> {
        if !page.has_more {
            return None;
        }
        Some(Self {
            start_index: page.start_index + page.items.len(),
            max_items: self.max_items,
            pagination_id: page.pagination_id.clone(),
        })
    }
}

/// One page of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub start_index: usize,
    pub max_items: Option<usize>,
    pub total: usize,
    pub has_more: bool,
    /// Present only while more pages remain.
    pub pagination_id: Option<String>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            start_index: self.start_index,
            max_items: self.max_items,
            total: self.total,
            has_more: self.has_more,
            pagination_id: self.pagination_id,
        }
    }
}

/// Serve `req` from `cache`, calling `fetch` when the token is absent or
/// no longer cached.
///
/// `fetch` returning `Ok(None)` means the query has no answer at all and
/// is passed through as `Ok(None)`.
pub async fn paginate<T, F, Fut>(
    req: &PageRequest,
    cache: &PaginationCache<T>,
    fetch: F,
) -> Result<Option<Page<T>>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Vec<T>>>>,
{
    let cached = req
        .pagination_id
        .as_deref()
        .and_then(|token| Some((token.to_string(), cache.get(token)?)));

    let (token, payload) = match cached {
        Some(hit) => {
            tracing::trace!(token = %hit.0, "serving page from snapshot");
            hit
        }
        None => {
            if let Some(stale) = &req.pagination_id {
                tracing::debug!(token = %stale, "pagination token expired, recomputing");
            }
            let Some(items) = fetch().await? else {
                return Ok(None);
            };
            let payload: Arc<[T]> = Arc::from(items);
            let token = cache.put_shared(Arc::clone(&payload));
            (token, payload)
        }
    };

    // A zero page size would never make progress.
    let max_items = req.max_items.filter(|&max| max > 0);
    let total = payload.len();
    let start = req.start_index.min(total);
    let end = match max_items {
        Some(max) => start.saturating_add(max).min(total),
        None => total,
    };
    let has_more = end < total;

    Ok(Some(Page {
        items: payload[start..end].to_vec(),
        start_index: req.start_index,
        max_items,
        total,
        has_more,
        pagination_id: has_more.then_some(token),
    }))
}
