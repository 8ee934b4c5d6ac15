//! TTL-expiring screenshot cache
//!
//! Maps a render request's identity (normalized URL plus viewport) to a
//! previously produced image. Entries are immutable after creation and
//! expire by age: lookups treat stale entries as absent and drop them,
//! and a background sweeper reclaims anything lookups never touch again.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Identity of a render request: normalized URL plus viewport dimensions.
///
/// Two requests are cache-equivalent iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(normalized_url: &str, width: u32, height: u32) -> Self {
        Self(format!("{normalized_url}:{width}x{height}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry {
    image: Arc<Vec<u8>>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Thread-safe in-memory cache of rendered page images.
///
/// Unbounded in entry count; effective memory is bounded by TTL-driven
/// expiry. `get`/`put` are safe under concurrent use from many in-flight
/// requests, and overwriting a key is safe because entries are never
/// mutated in place.
pub struct ScreenshotCache {
    entries: DashMap<CacheKey, CacheEntry>,
    default_ttl: Duration,
}

impl ScreenshotCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Look up a cached image. Entries past their TTL are treated as
    /// absent and removed.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                return Some(entry.image.clone());
            }
            drop(entry);
            self.entries.remove(key);
        }
        None
    }

    /// Store a freshly rendered image under `key` with the default TTL,
    /// overwriting any existing entry.
    pub fn put(&self, key: CacheKey, image: Arc<Vec<u8>>) {
        self.entries.insert(
            key,
            CacheEntry {
                image,
                created_at: Instant::now(),
                ttl: self.default_ttl,
            },
        );
    }

    /// Remove every expired entry. Lookups already ignore stale entries;
    /// this reclaims the memory of entries nothing reads again.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn the periodic sweeper task for this cache.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await; // first tick fires immediately
            loop {
                timer.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        })
    }
}
