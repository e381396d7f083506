//! In-memory key-value store (default, thread-safe, async).
//!
//! Uses DashMap for lock-free concurrent access with per-key sharding.
//! Automatically handles TTL expiration on access.

use super::{resolve_range, KvStore};
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

/// One stored value. Counters and lists are distinct kinds, as in Redis,
/// so type confusion surfaces as `WrongType` instead of garbage reads.
enum Slot {
    Bytes {
        data: Vec<u8>,
        expires_at: Option<Instant>,
    },
    Counter(i64),
    List(Vec<Vec<u8>>),
}

impl Slot {
    fn is_expired(&self) -> bool {
        match self {
            Slot::Bytes { expires_at, .. } => {
                expires_at.is_some_and(|exp| Instant::now() > exp)
            }
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Slot::Bytes { .. } => "bytes",
            Slot::Counter(_) => "counter",
            Slot::List(_) => "list",
        }
    }
}

/// Thread-safe async in-memory key-value store.
///
/// Uses DashMap for lock-free concurrent access with fine-grained per-key sharding.
/// No async locks required - operations are non-blocking.
/// Automatically handles TTL expiration on access.
///
/// # Example
///
/// ```no_run
/// use trace_kit::store::{InMemoryStore, KvStore};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     // Store data
///     store.set("key1", b"value".to_vec()).await?;
///
///     // Counters and lists
///     let count = store.increment("visits").await?;
///     assert_eq!(count, 1);
///     store.list_append("events", b"started".to_vec()).await?;
///
///     // Store with TTL
///     store.set_with_expiry("key2", b"expires".to_vec(), Duration::from_secs(300)).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    slots: Arc<DashMap<String, Slot>>,
}

impl InMemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            slots: Arc::new(DashMap::new()),
        }
    }

    /// Get the current number of keys in the store.
    pub async fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get store statistics.
    pub async fn stats(&self) -> StoreStats {
        let mut counters = 0;
        let mut lists = 0;
        let mut expired = 0;
        for entry in self.slots.iter() {
            match entry.value() {
                Slot::Counter(_) => counters += 1,
                Slot::List(_) => lists += 1,
                Slot::Bytes { .. } => {
                    if entry.value().is_expired() {
                        expired += 1;
                    }
                }
            }
        }

        StoreStats {
            total_keys: self.slots.len(),
            counter_keys: counters,
            list_keys: lists,
            expired_keys: expired,
        }
    }

    fn wrong_type(key: &str, found: &Slot, wanted: &str) -> Error {
        Error::WrongType(format!(
            "key {} holds {}, operation needs {}",
            key,
            found.kind(),
            wanted
        ))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(slot) = self.slots.get(key) {
            match slot.value() {
                Slot::Bytes { data, .. } if !slot.is_expired() => {
                    debug!("✓ InMemory GET {} -> HIT", key);
                    return Ok(Some(data.clone()));
                }
                Slot::Bytes { .. } => {}
                Slot::Counter(n) => {
                    debug!("✓ InMemory GET {} -> HIT (counter)", key);
                    return Ok(Some(n.to_string().into_bytes()));
                }
                other => return Err(Self::wrong_type(key, other, "bytes")),
            }
        } else {
            debug!("✓ InMemory GET {} -> MISS", key);
            return Ok(None);
        }

        // Remove the expired entry. A writer may have replaced the slot
        // between the read guard dropping and this call, so re-check
        // expiry instead of removing unconditionally.
        self.slots.remove_if(key, |_, slot| slot.is_expired());
        debug!("✓ InMemory GET {} -> MISS (expired)", key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.slots.insert(
            key.to_string(),
            Slot::Bytes {
                data: value,
                expires_at: None,
            },
        );
        debug!("✓ InMemory SET {}", key);
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.slots.insert(
            key.to_string(),
            Slot::Bytes {
                data: value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        debug!("✓ InMemory SETEX {} (TTL: {:?})", key, ttl);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert(Slot::Counter(0));
        match slot.value_mut() {
            Slot::Counter(n) => {
                *n += 1;
                debug!("✓ InMemory INCR {} -> {}", key, *n);
                Ok(*n)
            }
            other => Err(Self::wrong_type(key, other, "counter")),
        }
    }

    async fn list_append(&self, key: &str, value: Vec<u8>) -> Result<i64> {
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert(Slot::List(Vec::new()));
        match slot.value_mut() {
            Slot::List(items) => {
                items.push(value);
                let len = items.len() as i64;
                debug!("✓ InMemory RPUSH {} -> len {}", key, len);
                Ok(len)
            }
            other => Err(Self::wrong_type(key, other, "list")),
        }
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let Some(slot) = self.slots.get(key) else {
            debug!("✓ InMemory LRANGE {} -> 0 items (no key)", key);
            return Ok(Vec::new());
        };

        match slot.value() {
            Slot::List(items) => {
                let range = match resolve_range(items.len(), start, stop) {
                    Some((lo, hi)) => items[lo..=hi].to_vec(),
                    None => Vec::new(),
                };
                debug!("✓ InMemory LRANGE {} -> {} items", key, range.len());
                Ok(range)
            }
            other => Err(Self::wrong_type(key, other, "list")),
        }
    }

    async fn flush(&self) -> Result<()> {
        self.slots.clear();
        warn!("⚠ InMemory FLUSH executed - all keys, counters, and lists cleared!");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if let Some(slot) = self.slots.get(key) {
            return Ok(!slot.is_expired());
        }

        Ok(false)
    }

    async fn health_check(&self) -> Result<bool> {
        // In-memory store is always healthy
        Ok(true)
    }
}

/// Store statistics.
#[derive(Clone, Debug)]
pub struct StoreStats {
    pub total_keys: usize,
    pub counter_keys: usize,
    pub list_keys: usize,
    pub expired_keys: usize,
}
