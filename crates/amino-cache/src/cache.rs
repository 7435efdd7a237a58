use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::CacheBackend;
use crate::error::CacheError;
use crate::memory::MemoryBackend;
use crate::pattern::KeyPattern;

/// Typed, latency-bounded cache that never fails its caller.
///
/// Every backend call runs under `op_timeout`. Errors and timeouts are logged
/// and reported as a miss, a failed write (`false`), or a zero count.
#[derive(Clone)]
pub struct KeyValueCache {
    backend: Arc<dyn CacheBackend>,
    op_timeout: Duration,
}

impl KeyValueCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    /// Cache over a fresh [`MemoryBackend`].
    #[must_use]
    pub fn in_memory(op_timeout: Duration) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), op_timeout)
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Read and deserialize `key`. Corrupt data reads as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.bounded(self.backend.get(key)).await {
            Ok(raw) => raw?,
            Err(error) => {
                tracing::warn!(backend = self.backend.name(), key, %error, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "discarding malformed cache entry");
                None
            }
        }
    }

    /// Serialize and store `value` for `ttl`. Returns whether the write landed.
    ///
    /// A zero TTL is refused: every write from the core must expire.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        if ttl.is_zero() {
            tracing::debug!(key, "refusing cache write with zero ttl");
            return false;
        }
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key, %error, "cache value did not serialize");
                return false;
            }
        };
        match self.bounded(self.backend.set(key, raw, Some(ttl))).await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(backend = self.backend.name(), key, %error, "cache write failed");
                false
            }
        }
    }

    /// Remove one key. Returns whether a key was removed.
    pub async fn delete(&self, key: &str) -> bool {
        match self.bounded(self.backend.delete(key)).await {
            Ok(removed) => removed,
            Err(error) => {
                tracing::warn!(backend = self.backend.name(), key, %error, "cache delete failed");
                false
            }
        }
    }

    /// Remove every key matching the glob `pattern`. Zero matches is a no-op.
    pub async fn delete_matching(&self, pattern: &str) -> u64 {
        match KeyPattern::parse(pattern) {
            Ok(pattern) => self.delete_pattern(&pattern).await,
            Err(error) => {
                tracing::warn!(pattern, %error, "invalid cache key pattern");
                0
            }
        }
    }

    /// Remove every key matching a prepared pattern.
    pub async fn delete_pattern(&self, pattern: &KeyPattern) -> u64 {
        match self.bounded(self.backend.delete_matching(pattern)).await {
            Ok(count) => {
                tracing::debug!(%pattern, count, "invalidated cache keys");
                count
            }
            Err(error) => {
                tracing::warn!(backend = self.backend.name(), %pattern, %error, "cache invalidation failed");
                0
            }
        }
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }
}
