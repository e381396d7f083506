//! Time-bounded caching and access tracking for fetch-by-key operations.

use crate::error::{Error, Result};
use crate::key::KeyBuilder;
use crate::store::KvStore;
use std::time::Duration;

/// Default cache time-to-live for fetched bodies.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Trait for the underlying fetch transport.
///
/// Implementations fetch textual content by key (typically an HTTP GET by
/// URL) or fail with `Error::FetchFailed`.
#[allow(async_fn_in_trait)]
pub trait Fetcher: Send + Sync {
    /// Fetch the content identified by `key`.
    async fn fetch(&self, key: &str) -> Result<String>;
}

/// Memoizes a fetcher's results for a bounded time window while tracking
/// total access attempts.
///
/// Every call increments the per-key access counter, hit or miss - the
/// counter is a pure observability signal and never gates a fetch. On a hit
/// the cached body is returned without invoking the fetcher and without
/// extending its expiry. On a miss the fetcher runs and the result is stored
/// with the configured TTL. The counter never expires.
///
/// # Example
///
/// ```ignore
/// use trace_kit::{FetchCache, store::InMemoryStore};
/// use std::time::Duration;
///
/// let cache = FetchCache::new(InMemoryStore::new(), HttpFetcher::new()?)
///     .with_ttl(Duration::from_secs(30));
///
/// let body = cache.get("http://example.com").await?;
/// assert_eq!(cache.access_count("http://example.com").await?, 1);
/// ```
pub struct FetchCache<S: KvStore, F: Fetcher> {
    store: S,
    fetcher: F,
    ttl: Duration,
}

impl<S: KvStore, F: Fetcher> FetchCache<S, F> {
    /// Create a fetch cache with the default TTL.
    pub fn new(store: S, fetcher: F) -> Self {
        FetchCache {
            store,
            fetcher,
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fetch the content for `key`, serving from cache when possible.
    ///
    /// # Errors
    ///
    /// - `Error::FetchFailed` if the underlying fetch fails; no cache entry
    ///   is written and any prior cached value stays unchanged, but the
    ///   access counter has already been incremented
    /// - `Error::StoreUnavailable` if the backing store is unreachable
    pub async fn get(&self, key: &str) -> Result<String> {
        self.store.increment(&KeyBuilder::fetch_count(key)).await?;

        let body_key = KeyBuilder::fetch_body(key);
        if let Some(cached) = self.store.get(&body_key).await? {
            debug!("Fetch cache HIT for {}", key);
            return String::from_utf8(cached).map_err(|e| {
                Error::InvalidRecord(format!("cached body for {} is not UTF-8: {}", key, e))
            });
        }

        debug!("Fetch cache MISS for {}, fetching", key);
        let body = self.fetcher.fetch(key).await?;

        // Refresh resets the TTL; hits never extend it.
        self.store
            .set_with_expiry(&body_key, body.clone().into_bytes(), self.ttl)
            .await?;

        Ok(body)
    }

    /// Total fetch attempts for `key` (hits and misses both count).
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRecord` if the counter holds non-numeric bytes
    /// - `Error::StoreUnavailable` if the store is unreachable
    pub async fn access_count(&self, key: &str) -> Result<u64> {
        match self.store.get(&KeyBuilder::fetch_count(key)).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    Error::InvalidRecord(format!("access counter for {} is not UTF-8: {}", key, e))
                })?;
                text.parse::<u64>().map_err(|e| {
                    Error::InvalidRecord(format!("access counter for {} is not numeric: {}", key, e))
                })
            }
            None => Ok(0),
        }
    }
}

/// HTTP GET fetcher backed by reqwest.
#[cfg(feature = "http")]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Create a fetcher with a default client.
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
        }
    }

    /// Create a fetcher from an existing client (custom timeouts, proxies).
    pub fn with_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[cfg(feature = "http")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, key: &str) -> Result<String> {
        let response = self
            .client
            .get(key)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(format!("GET {} failed: {}", key, e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| Error::FetchFailed(format!("GET {} returned error status: {}", key, e)))?;

        response
            .text()
            .await
            .map_err(|e| Error::FetchFailed(format!("Reading body of {} failed: {}", key, e)))
    }
}
