//! Process-local cache backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::CacheBackend;
use crate::error::CacheError;
use crate::pattern::KeyPattern;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory backend with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of `key`, if it is live and has an expiry.
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let entry = entries.get(key).filter(|entry| entry.is_live(now))?;
        entry.expires_at.map(|at| at.saturating_duration_since(now))
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_matching(&self, pattern: &KeyPattern) -> Result<u64, CacheError> {
        let matcher = pattern.matcher()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matcher.is_match(key));
        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let backend = MemoryBackend::new();
        backend
            .set("info:protein:P1", "{}".to_string(), None)
            .await
            .unwrap();
        assert_eq!(
            backend.get("info:protein:P1").await.unwrap().as_deref(),
            Some("{}")
        );
        assert!(backend.delete("info:protein:P1").await.unwrap());
        assert!(!backend.delete("info:protein:P1").await.unwrap());
        assert_eq!(backend.get("info:protein:P1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent_and_are_purged() {
        let backend = MemoryBackend::new();
        backend
            .set("k", "v".to_string(), Some(Duration::from_millis(20)))
            .await
            .unwrap();
        assert_eq!(backend.len().await, 1);

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn delete_matching_counts_removed_keys() {
        let backend = MemoryBackend::new();
        for key in [
            "info:protein:P04637",
            "structure:protein:P04637",
            "entity_graph:Protein:P04637:2",
            "info:protein:Q00987",
        ] {
            backend.set(key, "1".to_string(), None).await.unwrap();
        }

        let removed = backend
            .delete_matching(&KeyPattern::containing("P04637"))
            .await
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(backend.len().await, 1);

        let none = backend
            .delete_matching(&KeyPattern::containing("P99999"))
            .await
            .unwrap();
        assert_eq!(none, 0);
    }

    #[tokio::test]
    async fn ttl_of_reports_remaining_lifetime() {
        let backend = MemoryBackend::new();
        backend
            .set("short", "v".to_string(), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        backend.set("forever", "v".to_string(), None).await.unwrap();

        let short = backend.ttl_of("short").await.unwrap();
        assert!(short <= Duration::from_secs(60));
        assert!(short > Duration::from_secs(50));
        assert_eq!(backend.ttl_of("forever").await, None);
        assert_eq!(backend.ttl_of("missing").await, None);
    }
}
