use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;
use crate::pattern::KeyPattern;

/// Raw string storage behind [`crate::KeyValueCache`].
///
/// Backends report failures honestly; absorption happens in the facade.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name for log fields.
    fn name(&self) -> &'static str;

    /// Stored value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`. `None` means no expiry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Remove one key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every key matching `pattern`. Returns the number removed.
    async fn delete_matching(&self, pattern: &KeyPattern) -> Result<u64, CacheError>;
}
