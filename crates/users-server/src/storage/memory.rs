//! In-memory cache using DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use users_core::{Cache, Result};

/// How often expired entries are swept out
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Simple in-memory cache with TTL support
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl MemoryCache {
    /// Must be called from within a tokio runtime; spawns the cleanup task.
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };

        cache.start_cleanup_task();

        cache
    }

    /// Get a value from cache
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let entry = self.data.get(key)?;
        if entry.is_expired(now) {
            drop(entry);
            self.evict_expired(key, now);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Set a value with TTL
    pub fn set_with_ttl(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Remove `key` only if it is still expired at `now`; a concurrent refresh wins
    fn evict_expired(&self, key: &str, now: Instant) {
        self.data.remove_if(key, |_, entry| entry.is_expired(now));
    }

    fn start_cleanup_task(&self) {
        let data = Arc::downgrade(&self.data);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;

                // Stop once the cache itself has been dropped
                let Some(data) = data.upgrade() else {
                    break;
                };

                let now = Instant::now();
                data.retain(|_, entry| !entry.is_expired(now));
            }
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(MemoryCache::get(self, key))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.set_with_ttl(key.to_string(), value, ttl);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(10_000);

    #[tokio::test]
    async fn test_get_and_set_through_port() {
        let cache = MemoryCache::new();
        let port: &dyn Cache = &cache;

        port.set("users-key", b"[]".to_vec(), TTL).await.unwrap();
        assert_eq!(port.get("users-key").await.unwrap(), Some(b"[]".to_vec()));

        // Test non-existent key
        assert_eq!(port.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_value() {
        let cache = MemoryCache::new();
        let port: &dyn Cache = &cache;

        port.set("users-key", vec![1], TTL).await.unwrap();
        port.set("users-key", vec![2], TTL).await.unwrap();
        assert_eq!(port.get("users-key").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl() {
        let cache = MemoryCache::new();

        cache.set_with_ttl("key1".to_string(), vec![1, 2, 3], TTL);
        tokio::time::advance(Duration::from_millis(9_999)).await;
        assert_eq!(cache.get("key1"), Some(vec![1, 2, 3]));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("key1"), None);
        // Expired read also evicts
        assert!(cache.data.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_read_keeps_refreshed_entry() {
        let cache = MemoryCache::new();

        cache.set_with_ttl("users-key".to_string(), vec![1], TTL);
        tokio::time::advance(TTL).await;
        let seen_expired_at = Instant::now();

        // A writer refreshes the entry after the reader saw it expired
        cache.set_with_ttl("users-key".to_string(), vec![2], TTL);
        cache.evict_expired("users-key", seen_expired_at);

        assert_eq!(cache.get("users-key"), Some(vec![2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_sweeps_expired_entries() {
        let cache = MemoryCache::new();

        cache.set_with_ttl("short".to_string(), vec![1], Duration::from_secs(1));
        cache.set_with_ttl("long".to_string(), vec![2], Duration::from_secs(3_600));
        assert_eq!(cache.data.len(), 2);

        // Let the sweeper run past its first interval
        tokio::time::sleep(CLEANUP_INTERVAL + Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.data.len(), 1);
        assert!(cache.data.contains_key("long"));
    }
}
