//! Permission Cache
//!
//! Resolved role → permission maps, kept per cache key until they are
//! invalidated or their TTL runs out. Role writes invalidate the shared
//! [`PERMISSION_CACHE_KEY`] entry after they commit.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::shared::error::Result;

/// Default key of the shared role → permission map.
pub const PERMISSION_CACHE_KEY: &str = "permission-cache";

/// Role name → names of the permissions it grants.
pub type RolePermissionMap = HashMap<String, BTreeSet<String>>;

/// Invalidation seam used by the role service.
pub trait PermissionCache: Send + Sync {
    /// Drop the entry stored under `key`. Missing keys are not an error.
    fn invalidate(&self, key: &str);
}

struct CacheEntry {
    value: Arc<RolePermissionMap>,
    stored_at: Instant,
}

/// Process-wide cache on a [`DashMap`].
///
/// The TTL bounds how stale an entry can get if an invalidation is lost.
/// The invalidation count doubles as a generation: a load that overlaps an
/// invalidation is returned to its caller but never stored.
pub struct InMemoryPermissionCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    invalidations: AtomicU64,
}

impl InMemoryPermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            invalidations: AtomicU64::new(0),
        }
    }

    /// Fresh entry under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Arc<RolePermissionMap>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(Arc::clone(&entry.value));
            }
        }
        // Only evict what is still expired, a concurrent put may have replaced it
        self.entries
            .remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        None
    }

    pub fn put(&self, key: &str, value: RolePermissionMap) -> Arc<RolePermissionMap> {
        let value = Arc::new(value);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: Arc::clone(&value),
                stored_at: Instant::now(),
            },
        );
        value
    }

    /// Cached entry under `key`, or the result of `load` stored in its place.
    ///
    /// A failed load leaves the cache untouched. A load that overlaps an
    /// invalidation is returned but not stored.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<RolePermissionMap>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RolePermissionMap>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        debug!(key, "Permission cache miss");
        let generation = self.invalidations.load(Ordering::SeqCst);
        let loaded = Arc::new(load().await?);

        // The shard lock held by `slot` orders this check against `invalidate`,
        // which bumps the generation before removing.
        let slot = self.entries.entry(key.to_string());
        if self.invalidations.load(Ordering::SeqCst) != generation {
            debug!(key, "Permission cache invalidated during load, not storing");
            return Ok(loaded);
        }

        let entry = CacheEntry {
            value: Arc::clone(&loaded),
            stored_at: Instant::now(),
        };
        match slot {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
        }
        Ok(loaded)
    }

    /// Number of invalidations since creation.
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PermissionCache for InMemoryPermissionCache {
    fn invalidate(&self, key: &str) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        let removed = self.entries.remove(key).is_some();
        debug!(key, removed, "Invalidated permission cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::PlatformError;

    fn map(role: &str, permissions: &[&str]) -> RolePermissionMap {
        let mut map = RolePermissionMap::new();
        map.insert(
            role.to_string(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
        map
    }

    #[test]
    fn test_put_get_invalidate() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(60));
        assert!(cache.get(PERMISSION_CACHE_KEY).is_none());

        cache.put(PERMISSION_CACHE_KEY, map("Editor", &["edit-post"]));
        let hit = cache.get(PERMISSION_CACHE_KEY).unwrap();
        assert!(hit["Editor"].contains("edit-post"));
        assert_eq!(cache.len(), 1);

        cache.invalidate(PERMISSION_CACHE_KEY);
        assert!(cache.get(PERMISSION_CACHE_KEY).is_none());
        assert_eq!(cache.invalidation_count(), 1);
    }

    #[test]
    fn test_invalidate_missing_key_still_counts() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(60));
        cache.invalidate("nothing-here");
        assert_eq!(cache.invalidation_count(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = InMemoryPermissionCache::new(Duration::ZERO);
        cache.put(PERMISSION_CACHE_KEY, map("Editor", &[]));
        assert!(cache.get(PERMISSION_CACHE_KEY).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_load_loads_once() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(60));
        let loads = AtomicU64::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_load(PERMISSION_CACHE_KEY, || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(map("Editor", &["edit-post"]))
                })
                .await
                .unwrap();
            assert_eq!(value.len(), 1);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_overlapping_invalidation_is_not_stored() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(60));

        let value = cache
            .get_or_load(PERMISSION_CACHE_KEY, || async {
                cache.invalidate(PERMISSION_CACHE_KEY);
                Ok(map("Editor", &[]))
            })
            .await
            .unwrap();
        assert!(value.contains_key("Editor"));
        assert!(cache.get(PERMISSION_CACHE_KEY).is_none());

        cache
            .get_or_load(PERMISSION_CACHE_KEY, || async { Ok(map("Editor", &["edit-post"])) })
            .await
            .unwrap();
        assert!(cache.get(PERMISSION_CACHE_KEY).unwrap()["Editor"].contains("edit-post"));
    }

    #[test]
    fn test_expired_lookup_keeps_fresh_replacement() {
        let cache = InMemoryPermissionCache::new(Duration::from_millis(50));
        cache.put(PERMISSION_CACHE_KEY, map("Editor", &[]));
        std::thread::sleep(Duration::from_millis(60));

        cache.put(PERMISSION_CACHE_KEY, map("Editor", &["edit-post"]));
        let hit = cache.get(PERMISSION_CACHE_KEY).unwrap();
        assert!(hit["Editor"].contains("edit-post"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(60));
        let result = cache
            .get_or_load(PERMISSION_CACHE_KEY, || async {
                Err(PlatformError::internal("store offline"))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
