//! Per-key single-flight TTL memoization.
//!
//! `get_or_compute` returns the memoized value while it is younger than the
//! TTL; once stale, exactly one caller recomputes it while every concurrent
//! caller for the same key awaits the same slot and observes the in-flight
//! result. Keys are independent: the slot lock is per key, so unrelated
//! probes never serialize against each other.
//!
//! Entries are overwritten on refresh and never evicted; the key space is
//! the small fixed set of probe identities (plus serialized arguments), so
//! unbounded growth is not a concern here.
//!
//! Time is measured with `tokio::time::Instant`, which makes the TTL
//! testable under `tokio::time::pause`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Slot<T> {
    inner: Mutex<Option<(T, Instant)>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

/// TTL cache guaranteeing at most one concurrent recomputation per key.
pub struct CoalescingCache<T: Clone> {
    ttl: Duration,
    slots: DashMap<String, Arc<Slot<T>>>,
}

impl<T: Clone> CoalescingCache<T> {
    /// Create a cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, recomputing it if stale.
    ///
    /// Holding the slot lock across `compute` is what provides the
    /// single-flight guarantee: late arrivals block on the lock and then
    /// find a fresh entry instead of recomputing.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Slot::default()))
            .clone();

        let mut guard = slot.inner.lock().await;
        if let Some((value, captured_at)) = guard.as_ref() {
            if captured_at.elapsed() < self.ttl {
                return value.clone();
            }
        }

        let value = compute().await;
        *guard = Some((value.clone(), Instant::now()));
        value
    }

    /// Drop the entry for `key`, forcing the next read to recompute.
    pub fn invalidate(&self, key: &str) {
        self.slots.remove(key);
    }
}
