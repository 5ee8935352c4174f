use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

pub const PACK_TYPES_KEY: &str = "pack-types";
pub const SUPPLY_STATS_KEY: &str = "supply-stats";

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

#[derive(Default)]
struct Slot {
    /// Bumped by every invalidation; a fetch that started under an older
    /// generation must not store its result.
    generation: u64,
    entry: Option<CacheEntry>,
}

/// In-process TTL cache for read-heavy responses.
///
/// Entries are per-process; other instances keep their own copies until the
/// TTL runs out.
#[derive(Default)]
pub struct ResponseCache {
    slots: DashMap<&'static str, Slot>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a live entry, dropping it if expired or of another type.
    pub fn get<T: Clone + Send + Sync + 'static>(&self, key: &'static str) -> Option<T> {
        let mut slot = self.slots.get_mut(key)?;
        let entry = slot.entry.as_ref()?;
        if entry.expires_at > Instant::now()
            && let Some(value) = entry.value.downcast_ref::<T>()
        {
            return Some(value.clone());
        }
        slot.entry = None;
        None
    }

    pub fn insert<T: Send + Sync + 'static>(&self, key: &'static str, value: T, ttl: Duration) {
        let generation = self.generation(key);
        self.insert_at(key, value, ttl, generation);
    }

    /// Store `value` unless `key` was invalidated since `generation` was read.
    fn insert_at<T: Send + Sync + 'static>(
        &self,
        key: &'static str,
        value: T,
        ttl: Duration,
        generation: u64,
    ) {
        if ttl.is_zero() {
            return;
        }
        let mut slot = self.slots.entry(key).or_default();
        if slot.generation != generation {
            return;
        }
        slot.entry = Some(CacheEntry {
            value: Arc::new(value),
            expires_at: Instant::now() + ttl,
        });
    }

    fn generation(&self, key: &'static str) -> u64 {
        self.slots.get(key).map(|slot| slot.generation).unwrap_or(0)
    }

    /// Drop `key` and discard results of fetches already in flight.
    pub fn invalidate(&self, key: &'static str) {
        let mut slot = self.slots.entry(key).or_default();
        slot.generation += 1;
        slot.entry = None;
    }

    /// Serve `key` from cache, or run `fetch` and cache its success.
    ///
    /// Concurrent misses may each run `fetch`; the last writer wins. A result
    /// whose fetch overlapped an invalidation is returned but not cached.
    pub async fn get_or_try_insert_with<T, E, F, Fut>(
        &self,
        key: &'static str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            return Ok(hit);
        }
        let generation = self.generation(key);
        let value = fetch().await?;
        self.insert_at(key, value.clone(), ttl, generation);
        Ok(value)
    }
}
