//! Offset pagination.
//!
//! The target system exposes `first`/`max` style pagination. A collection is
//! complete once a page comes back shorter than requested.

use std::future::Future;

use tracing::trace;

use crate::error::{SyncError, SyncResult};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Offset of the first item.
    pub first: usize,
    /// Maximum number of items in the page.
    pub max: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub const fn new(first: usize, max: usize) -> Self {
        Self { first, max }
    }

    /// Returns the request for the page after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            first: self.first + self.max,
            max: self.max,
        }
    }
}

/// Fetches every page and returns the concatenated items.
///
/// Stops after the first page holding fewer than `page_size` items. The first
/// error aborts the collection; no partial list is returned.
pub async fn collect_pages<T, F, Fut>(page_size: usize, mut fetch: F) -> SyncResult<Vec<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = SyncResult<Vec<T>>>,
{
    if page_size == 0 {
        return Err(SyncError::config("page size must be positive"));
    }

    let mut items = Vec::new();
    let mut request = PageRequest::new(0, page_size);

    loop {
        let page = fetch(request).await?;
        let received = page.len();
        items.extend(page);

        trace!(first = request.first, received, "fetched page");

        if received < page_size {
            return Ok(items);
        }
        request = request.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves fixed page sizes and records every request.
    async fn collect_sized(sizes: &[usize], page_size: usize) -> (SyncResult<Vec<usize>>, Vec<PageRequest>) {
        let mut requests = Vec::new();
        let mut served = 0usize;
        let result = collect_pages(page_size, |req| {
            requests.push(req);
            let size = sizes.get(requests.len() - 1).copied().unwrap_or(0);
            let page: Vec<usize> = (served..served + size).collect();
            served += size;
            async move { Ok(page) }
        })
        .await;
        (result, requests)
    }

    #[tokio::test]
    async fn stops_on_short_page() {
        let (result, requests) = collect_sized(&[100, 100, 37], 100).await;
        let items = result.unwrap();

        assert_eq!(items.len(), 237);
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[2], PageRequest::new(200, 100));
        assert_eq!(items.last(), Some(&236));
    }

    #[tokio::test]
    async fn stops_on_empty_page_after_full_pages() {
        let (result, requests) = collect_sized(&[100, 100, 100, 0], 100).await;

        assert_eq!(result.unwrap().len(), 300);
        assert_eq!(requests.len(), 4);
    }

    #[tokio::test]
    async fn single_empty_page() {
        let (result, requests) = collect_sized(&[0], 100).await;

        assert!(result.unwrap().is_empty());
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn error_discards_partial_results() {
        let mut calls = 0;
        let result: SyncResult<Vec<u32>> = collect_pages(2, |_| {
            calls += 1;
            let outcome = if calls == 2 {
                Err(SyncError::connection("reset"))
            } else {
                Ok(vec![1, 2])
            };
            async move { outcome }
        })
        .await;

        assert!(matches!(result, Err(SyncError::Connection(_))));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn rejects_zero_page_size() {
        let result: SyncResult<Vec<u32>> = collect_pages(0, |_| async { Ok(Vec::new()) }).await;
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }
}
