//! The tagged read-through cache engine.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::RwLock;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::{CacheKey, CacheTag};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT: &str = "libris_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "libris_cache_miss_total";
pub(crate) const METRIC_CACHE_INVALIDATED: &str = "libris_cache_invalidated_entries_total";

/// What a loader hands back on a miss: the payload to cache plus the
/// tags the new entry belongs to. Tags are declared in the return value
/// so population never mutates cache state as a side effect.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub payload: Bytes,
    pub tags: Vec<CacheTag>,
}

impl Loaded {
    pub fn tagged(payload: impl Into<Bytes>, tag: CacheTag) -> Self {
        Self {
            payload: payload.into(),
            tags: vec![tag],
        }
    }
}

struct CacheEntry {
    payload: Bytes,
    tags: Vec<CacheTag>,
}

struct CacheInner {
    entries: LruCache<CacheKey, CacheEntry>,
    tagged: HashMap<CacheTag, HashSet<CacheKey>>,
}

/// Read-through cache with tag-grouped invalidation.
///
/// One lock guards both the entry store and the tag index, so a key's
/// entry and its index membership never diverge. The lock is never held
/// across an await: a loader runs lock-free, which means concurrent
/// misses on the same key may each compute the value. The last insert
/// wins and the index absorbs the duplicate.
pub struct TagCache {
    enabled: bool,
    inner: RwLock<CacheInner>,
}

impl TagCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            inner: RwLock::new(CacheInner {
                entries: LruCache::new(config.entry_limit_non_zero()),
                tagged: HashMap::new(),
            }),
        }
    }

    /// Return the live cached payload for `key`, otherwise await
    /// `loader`, store its payload under the tags it declares, and
    /// return it. Loader failures propagate and nothing is stored.
    pub async fn get_with<F, Fut, E>(&self, key: CacheKey, loader: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Loaded, E>>,
    {
        if !self.enabled {
            return loader().await.map(|loaded| loaded.payload);
        }

        if let Some(payload) = self.lookup(&key) {
            counter!(METRIC_CACHE_HIT).increment(1);
            return Ok(payload);
        }

        counter!(METRIC_CACHE_MISS).increment(1);
        debug!(target: "libris::cache", key = %key, "cache miss, running loader");
        let loaded = loader().await?;
        let payload = loaded.payload.clone();
        self.insert(key, loaded);
        Ok(payload)
    }

    /// Drop every entry carrying any of `tags`. Invalidating a tag with
    /// no live entries is a no-op, never an error.
    pub fn invalidate_tags(&self, tags: &[CacheTag]) {
        if !self.enabled {
            return;
        }

        let mut inner = rw_write(&self.inner, SOURCE, "invalidate_tags");
        let mut dropped: u64 = 0;
        for tag in tags {
            let Some(keys) = inner.tagged.remove(tag) else {
                continue;
            };
            for key in keys {
                let Some(entry) = inner.entries.pop(&key) else {
                    continue;
                };
                dropped += 1;
                // An entry may carry more tags than the one being
                // invalidated; unlink it from the rest of the index.
                for other in &entry.tags {
                    if other == tag {
                        continue;
                    }
                    if let Some(set) = inner.tagged.get_mut(other) {
                        set.remove(&key);
                    }
                }
            }
        }

        if dropped > 0 {
            counter!(METRIC_CACHE_INVALIDATED).increment(dropped);
            debug!(
                target: "libris::cache",
                entries = dropped,
                "invalidated tagged cache entries"
            );
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        rw_read(&self.inner, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // LruCache::get updates recency and needs the write half.
    fn lookup(&self, key: &CacheKey) -> Option<Bytes> {
        rw_write(&self.inner, SOURCE, "lookup")
            .entries
            .get(key)
            .map(|entry| entry.payload.clone())
    }

    fn insert(&self, key: CacheKey, loaded: Loaded) {
        let Loaded { payload, tags } = loaded;
        let mut inner = rw_write(&self.inner, SOURCE, "insert");

        for tag in &tags {
            inner.tagged.entry(*tag).or_default().insert(key.clone());
        }

        let entry = CacheEntry {
            payload,
            tags: tags.clone(),
        };
        if let Some((displaced_key, displaced_entry)) = inner.entries.push(key.clone(), entry) {
            // push returns the old value when the key was already
            // present, and the LRU victim when capacity forced an
            // eviction; only tags no longer backed by a live entry may
            // be unlinked.
            for tag in &displaced_entry.tags {
                if displaced_key == key && tags.contains(tag) {
                    continue;
                }
                if let Some(set) = inner.tagged.get_mut(tag) {
                    set.remove(&displaced_key);
                }
            }
        }
    }
}
