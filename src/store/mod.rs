//! Key-value store implementations.

use crate::error::Result;
use std::time::Duration;

pub mod inmemory;
#[cfg(feature = "redis")]
pub mod redis;

pub use inmemory::InMemoryStore;
#[cfg(feature = "redis")]
pub use redis::{PoolStats, RedisConfig, RedisStore};

/// Trait for backing key-value store implementations.
///
/// Abstracts the store operations the instrumentation layers consume,
/// allowing swappable stores. Implementations: InMemory (default), Redis.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` to allow concurrent access.
/// Store implementations should use interior mutability (DashMap, Mutex, or external storage).
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait KvStore: Send + Sync + Clone {
    /// Retrieve value by key.
    ///
    /// Counter keys read back as their decimal ASCII form, matching Redis.
    ///
    /// # Returns
    /// - `Ok(Some(bytes))` - Value found
    /// - `Ok(None)` - Key not found or expired
    ///
    /// # Errors
    /// - `Error::WrongType` if the key holds a list
    /// - `Error::StoreUnavailable` if the store is unreachable
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store value under key, replacing any existing value.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Store value under key with a time-to-live.
    ///
    /// The value is unreadable after `ttl` elapses; expiry is evaluated
    /// lazily at lookup time, not by a background sweep.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable
    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Atomically increment the counter at key, creating it at 0 first.
    ///
    /// # Returns
    /// The counter value after the increment.
    ///
    /// # Errors
    /// - `Error::WrongType` if the key holds a non-counter value
    /// - `Error::StoreUnavailable` if the store is unreachable
    async fn increment(&self, key: &str) -> Result<i64>;

    /// Append value to the list at key, creating the list if absent.
    ///
    /// # Returns
    /// The list length after the append.
    ///
    /// # Errors
    /// - `Error::WrongType` if the key holds a non-list value
    /// - `Error::StoreUnavailable` if the store is unreachable
    async fn list_append(&self, key: &str, value: Vec<u8>) -> Result<i64>;

    /// Read a range of the list at key in insertion order.
    ///
    /// Redis index semantics: `start` and `stop` are inclusive, negative
    /// indices count from the tail (`-1` is the last element), out-of-range
    /// indices clamp, and an inverted range yields an empty result.
    /// A missing key reads as an empty list.
    ///
    /// # Errors
    /// - `Error::WrongType` if the key holds a non-list value
    /// - `Error::StoreUnavailable` if the store is unreachable
    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>>;

    /// Remove all keys, counters, and lists.
    ///
    /// This is the only operation that resets call counters.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable
    async fn flush(&self) -> Result<()>;

    /// Check if key exists and is unexpired (optional optimization).
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Health check - verify the store is accessible.
    ///
    /// Used for readiness probes, circuit breakers, etc.
    ///
    /// # Errors
    /// Returns `Err` if the store is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Resolve a Redis-style inclusive index pair against a list length.
///
/// Returns `None` when the resolved range is empty.
pub(crate) fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    if len == 0 {
        return None;
    }

    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };

    if start < 0 {
        start = 0;
    }
    if stop >= len {
        stop = len - 1;
    }
    if start > stop || start >= len || stop < 0 {
        return None;
    }

    Some((start as usize, stop as usize))
}
