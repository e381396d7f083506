//! Typed read veneer over any key-value store.

use crate::error::{Error, Result};
use crate::store::KvStore;

/// Reads stored values back in a requested type.
///
/// The store holds raw bytes; callers that know what they wrote get their
/// type back without sprinkling conversions at every call site.
pub struct TypedReader<S: KvStore> {
    store: S,
}

impl<S: KvStore> TypedReader<S> {
    pub fn new(store: S) -> Self {
        TypedReader { store }
    }

    /// Read raw bytes; `None` if the key is absent or expired.
    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    /// Read a value as a UTF-8 string.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` if the stored bytes are not UTF-8.
    pub async fn read_str(&self, key: &str) -> Result<Option<String>> {
        match self.store.get(key).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| Error::InvalidRecord(format!("value at {} is not UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Read a value as a signed integer.
    ///
    /// # Errors
    /// Returns `Error::InvalidRecord` if the stored bytes are not a decimal integer.
    pub async fn read_int(&self, key: &str) -> Result<Option<i64>> {
        match self.read_str(key).await? {
            Some(text) => text.parse::<i64>().map(Some).map_err(|e| {
                Error::InvalidRecord(format!("value at {} is not an integer: {}", key, e))
            }),
            None => Ok(None),
        }
    }
}
