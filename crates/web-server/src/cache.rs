use core_types::{DateRange, RatingDirection};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// Which derived view a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Summary,
    DailyOrders,
    CategoryRatings,
    CategoryVolume,
    StateRatings,
    StateRevenue,
    PaymentMix,
    CustomerStates,
    CustomerMap,
}

/// The full identity of one memoized computation: the view, the effective
/// (already clamped) date range, and any truncation/direction parameters.
///
/// `range: None` is the "requested window holds no data" case; it is cached
/// like any other result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub view: ViewKind,
    pub range: Option<DateRange>,
    pub k: Option<usize>,
    pub direction: Option<RatingDirection>,
}

impl CacheKey {
    pub fn new(view: ViewKind, range: Option<DateRange>) -> Self {
        Self {
            view,
            range,
            k: None,
            direction: None,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_direction(mut self, direction: RatingDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Explicit memoization for the derived views.
///
/// Replaces ad-hoc caching decorators with a cache keyed by the computation's
/// full identity, emptied whenever the underlying record set is replaced.
/// Bounded: once `MAX_ENTRIES` distinct keys accumulate, the oldest entries
/// are evicted first, so a stream of one-off date ranges cannot grow the
/// cache for the life of the process.
#[derive(Debug, Default)]
pub struct ViewCache {
    inner: RwLock<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Value>,
    /// Keys in insertion order, used for eviction.
    order: VecDeque<CacheKey>,
}

impl ViewCache {
    /// Upper bound on memoized views held at once.
    pub const MAX_ENTRIES: usize = 512;

    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, computing and storing it on a
    /// miss. The closure runs outside any lock.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        if let Some(value) = self
            .inner
            .read()
            .expect("view cache poisoned")
            .entries
            .get(&key)
        {
            return value.clone();
        }
        let value = compute();

        let mut inner = self.inner.write().expect("view cache poisoned");
        if inner.entries.insert(key.clone(), value.clone()).is_none() {
            inner.order.push_back(key);
            while inner.entries.len() > Self::MAX_ENTRIES {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        value
    }

    /// Drops every entry. Called when the record set changes, since every
    /// cached view was derived from the old data.
    pub fn invalidate(&self) {
        let mut inner = self.inner.write().expect("view cache poisoned");
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.order.clear();
        tracing::debug!(dropped, "View cache invalidated.");
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("view cache poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn second_lookup_with_same_key_does_not_recompute() {
        let cache = ViewCache::new();
        let key = CacheKey::new(ViewKind::Summary, None);

        let first = cache.get_or_compute(key.clone(), || json!({"orders": 10}));
        let second = cache.get_or_compute(key, || panic!("must be served from cache"));
        assert_eq!(first, second);
    }

    #[test]
    fn keys_differing_in_k_are_distinct() {
        let cache = ViewCache::new();
        let base = CacheKey::new(ViewKind::CategoryVolume, None);

        cache.get_or_compute(base.clone().with_k(5), || json!(5));
        cache.get_or_compute(base.with_k(10), || json!(10));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn oldest_entry_is_evicted_once_the_cache_is_full() {
        let cache = ViewCache::new();
        let base = CacheKey::new(ViewKind::DailyOrders, None);
        for k in 0..=ViewCache::MAX_ENTRIES {
            cache.get_or_compute(base.clone().with_k(k), || json!(k));
        }
        assert_eq!(cache.len(), ViewCache::MAX_ENTRIES);

        // The first key went in earliest, so it is the one that was dropped.
        let mut recomputed = false;
        cache.get_or_compute(base.clone().with_k(0), || {
            recomputed = true;
            json!(0)
        });
        assert!(recomputed);

        // The most recent key is still served from the cache.
        cache.get_or_compute(base.with_k(ViewCache::MAX_ENTRIES), || {
            panic!("must be served from cache")
        });
    }

    #[test]
    fn invalidate_empties_the_cache() {
        let cache = ViewCache::new();
        cache.get_or_compute(CacheKey::new(ViewKind::DailyOrders, None), || json!([]));
        assert!(!cache.is_empty());

        cache.invalidate();
        assert!(cache.is_empty());

        let mut recomputed = false;
        cache.get_or_compute(CacheKey::new(ViewKind::DailyOrders, None), || {
            recomputed = true;
            json!([])
        });
        assert!(recomputed);
    }
}
