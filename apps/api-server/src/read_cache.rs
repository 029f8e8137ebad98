//! Cache for anonymous read responses.
//!
//! Every invalidation bumps a generation counter. A response computed
//! before an invalidation is never left behind in the cache: it is skipped
//! when the generation moved before the write, and removed again when it
//! moved during the write.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use quill_core::ports::Cache;

#[derive(Clone)]
pub struct ReadCache {
    inner: Arc<dyn Cache>,
    generation: Arc<AtomicU64>,
}

impl ReadCache {
    pub fn new(inner: Arc<dyn Cache>) -> Self {
        Self {
            inner,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Snapshot to take before loading the data a response is built from.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    /// Store `value` unless an invalidation happened since `generation`.
    pub async fn store(&self, key: &str, value: &str, ttl: Duration, generation: u64) {
        if self.generation() != generation {
            tracing::debug!(key = %key, "Skipping cache write for outdated response");
            return;
        }

        if let Err(e) = self.inner.set(key, value, Some(ttl)).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache response");
            return;
        }

        if self.generation() != generation {
            if let Err(e) = self.inner.delete(key).await {
                tracing::warn!(key = %key, error = %e, "Failed to drop outdated response");
            }
        }
    }

    /// Drop every entry under `prefix`.
    pub async fn invalidate(&self, prefix: &str) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.inner.delete_prefix(prefix).await {
            tracing::warn!(prefix = %prefix, error = %e, "Failed to invalidate cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_core::ports::CacheError;
    use quill_infra::InMemoryCache;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_store_and_hit() {
        let cache = ReadCache::new(Arc::new(InMemoryCache::new()));
        let generation = cache.generation();
        cache.store("posts:list", "[]", TTL, generation).await;
        assert_eq!(cache.get("posts:list").await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_response_loaded_before_invalidation_is_not_cached() {
        let cache = ReadCache::new(Arc::new(InMemoryCache::new()));

        let generation = cache.generation();
        // A write lands while the reader is still building its response.
        cache.invalidate("posts:").await;
        cache.store("posts:list", "[\"stale\"]", TTL, generation).await;

        assert!(cache.get("posts:list").await.is_none());

        let fresh = cache.generation();
        cache.store("posts:list", "[\"fresh\"]", TTL, fresh).await;
        assert_eq!(cache.get("posts:list").await.as_deref(), Some("[\"fresh\"]"));
    }

    /// Simulates an invalidation that runs while `set` is in flight.
    struct InvalidatedMidWrite {
        inner: InMemoryCache,
        generation: Arc<AtomicU64>,
    }

    #[async_trait]
    impl Cache for InvalidatedMidWrite {
        async fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
            self.inner.set(key, value, ttl).await?;
            self.generation.fetch_add(1, Ordering::AcqRel);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.inner.delete(key).await
        }

        async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
            self.inner.delete_prefix(prefix).await
        }
    }

    #[tokio::test]
    async fn test_invalidation_during_write_removes_the_entry() {
        let generation = Arc::new(AtomicU64::new(0));
        let cache = ReadCache {
            inner: Arc::new(InvalidatedMidWrite {
                inner: InMemoryCache::new(),
                generation: generation.clone(),
            }),
            generation,
        };

        let before = cache.generation();
        cache.store("posts:item:hello", "{}", TTL, before).await;

        assert!(cache.get("posts:item:hello").await.is_none());
    }
}
