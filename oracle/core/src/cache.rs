//! Invalidation-Driven Query Cache
//!
//! Read-through cache for server-owned data (logs, summary, plans). The
//! client never originates this data; it only holds the last fetched value
//! and a staleness flag. Invalidation is fire-and-forget: mark stale now,
//! refetch on the next read.
//!
//! The query is the serialization unit — concurrent readers of a stale
//! cache coalesce onto a single in-flight fetch rather than racing.

use std::future::Future;

use parking_lot::Mutex;

/// State held per query
#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    stale: bool,
}

/// A single cached query with invalidation and fetch coalescing
#[derive(Debug)]
pub struct CachedQuery<T> {
    name: &'static str,
    slot: Mutex<Slot<T>>,
    /// Held across a refetch so concurrent readers coalesce
    inflight: tokio::sync::Mutex<()>,
}

impl<T: Clone> CachedQuery<T> {
    /// Create an empty (stale) cache for the named query
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Mutex::new(Slot {
                value: None,
                stale: true,
            }),
            inflight: tokio::sync::Mutex::new(()),
        }
    }

    /// Mark the cached value stale; the next read refetches
    pub fn invalidate(&self) {
        self.slot.lock().stale = true;
        tracing::debug!(query = self.name, "cache invalidated");
    }

    /// Drop the cached value entirely (logout / reset)
    pub fn clear(&self) {
        let mut slot = self.slot.lock();
        slot.value = None;
        slot.stale = true;
    }

    /// Whether the next read will refetch
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let slot = self.slot.lock();
        slot.stale || slot.value.is_none()
    }

    /// Last fetched value, fresh or not, without triggering a fetch
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.slot.lock().value.clone()
    }

    /// Read through the cache, refetching with `fetch` when stale
    ///
    /// A failed fetch leaves the slot stale and propagates the error; the
    /// previous value (if any) is kept for `peek` callers.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`.
    pub async fn get_with<F, Fut, E>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh_value() {
            return Ok(value);
        }

        let _guard = self.inflight.lock().await;

        // Another reader may have refreshed while we waited for the guard.
        if let Some(value) = self.fresh_value() {
            return Ok(value);
        }

        tracing::debug!(query = self.name, "cache refetch");
        let value = fetch().await?;
        let mut slot = self.slot.lock();
        slot.value = Some(value.clone());
        slot.stale = false;
        Ok(value)
    }

    fn fresh_value(&self) -> Option<T> {
        let slot = self.slot.lock();
        if slot.stale {
            None
        } else {
            slot.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    async fn counted_fetch(counter: &AtomicU32) -> Result<u32, &'static str> {
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test]
    async fn test_fresh_value_is_not_refetched() {
        let cache = CachedQuery::new("logs");
        let fetches = AtomicU32::new(0);

        let first = cache.get_with(|| counted_fetch(&fetches)).await.unwrap();
        let second = cache.get_with(|| counted_fetch(&fetches)).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = CachedQuery::new("summary");
        let fetches = AtomicU32::new(0);

        cache.get_with(|| counted_fetch(&fetches)).await.unwrap();
        assert!(!cache.is_stale());

        cache.invalidate();
        assert!(cache.is_stale());

        let value = cache.get_with(|| counted_fetch(&fetches)).await.unwrap();
        assert_eq!(value, 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_stays_stale_and_keeps_old_value() {
        let cache: CachedQuery<u32> = CachedQuery::new("plans");
        cache
            .get_with(|| async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        cache.invalidate();

        let err = cache
            .get_with(|| async { Err::<u32, _>("boom") })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_stale());
        assert_eq!(cache.peek(), Some(7));
    }

    #[tokio::test]
    async fn test_concurrent_readers_coalesce_one_fetch() {
        let cache = Arc::new(CachedQuery::new("logs"));
        let fetches = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let fetches = Arc::clone(&fetches);
            handles.push(tokio::spawn(async move {
                cache
                    .get_with(|| async move {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        Ok::<_, &'static str>(42)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_value() {
        let cache = CachedQuery::new("profile");
        cache
            .get_with(|| async { Ok::<_, &str>(1) })
            .await
            .unwrap();
        cache.clear();
        assert_eq!(cache.peek(), None);
        assert!(cache.is_stale());
    }
}
