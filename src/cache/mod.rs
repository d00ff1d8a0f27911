//! In-memory TTL cache for aggregation results.
//!
//! Entries expire logically at `expires_at` and are physically removed on
//! the next read of their key, by [`TtlCache::sweep`], or by
//! [`TtlCache::clear`]. A write always replaces the prior entry for its key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Drop every expired entry. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns the live value for `key`, evicting it if expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

/// Periodically sweep expired entries so the cache stays bounded even when
/// keys are written but never read again.
pub fn spawn_sweeper<V>(cache: Arc<TtlCache<V>>, interval: Duration) -> JoinHandle<()>
where
    V: Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = cache.sweep().await;
            if removed > 0 {
                tracing::debug!("Swept {} expired cache entries", removed);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl() {
        let cache = TtlCache::new();
        cache.set("k", 42u32, Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 42u32, Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k").await, None);
        // Expired entry was physically evicted by the read.
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_existing_entry() {
        let cache = TtlCache::new();
        cache.set("k", 1u32, Duration::from_secs(60)).await;
        cache.set("k", 2u32, Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_everything() {
        let cache = TtlCache::new();
        cache.set("a", 1u32, Duration::from_secs(60)).await;
        cache.set("b", 2u32, Duration::from_secs(60)).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = TtlCache::new();
        cache.set("short", 1u32, Duration::from_secs(10)).await;
        cache.set("long", 2u32, Duration::from_secs(100)).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.get("long").await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_works_without_clone_values() {
        struct Opaque(#[allow(dead_code)] u32);

        let cache: TtlCache<Opaque> = TtlCache::default();
        cache.set("k", Opaque(7), Duration::from_secs(1)).await;
        assert_eq!(cache.len().await, 1);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.sweep().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_evicts_unread_entries() {
        let cache = Arc::new(TtlCache::new());
        cache.set("k", 1u32, Duration::from_secs(5)).await;
        let handle = spawn_sweeper(cache.clone(), Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(21)).await;
        tokio::task::yield_now().await;
        assert!(cache.is_empty().await);
        handle.abort();
    }
}
