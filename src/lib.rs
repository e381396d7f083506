//! # trace-kit
//!
//! Composable call instrumentation, replay tracing, and response caching
//! over key-value stores.
//!
//! ## Features
//!
//! - **Composable Layers:** Counting and history logging are independent
//!   decorators over a common operation trait; apply either, both, or neither
//! - **Store Agnostic:** In-memory store by default, Redis behind a feature,
//!   or any custom [`KvStore`] implementation
//! - **Replayable:** Recorded history renders as a human-readable trace
//! - **Bounded Caching:** Fetch results cached with a TTL while every access
//!   attempt is counted
//! - **Versioned Records:** History entries use a tagged, versioned encoding
//!   instead of ad-hoc strings
//!
//! ## Quick Start
//!
//! ```ignore
//! use trace_kit::{
//!     InstrumentedStore, ReplayLog, StoreOp,
//!     serialization::ArgValue,
//!     store::InMemoryStore,
//! };
//!
//! // 1. Define an operation with a stable identity
//! #[derive(Clone)]
//! struct StoreData {
//!     store: InMemoryStore,
//! }
//!
//! impl StoreOp for StoreData {
//!     fn name(&self) -> &str { "Cache.store" }
//!
//!     async fn invoke(&self, args: &[ArgValue]) -> trace_kit::Result<String> {
//!         let key = uuid::Uuid::new_v4().to_string();
//!         // ... persist args[0] under key ...
//!         Ok(key)
//!     }
//! }
//!
//! // 2. Wrap it - every call is now counted and logged
//! let store = InMemoryStore::new();
//! let wrapped = InstrumentedStore::new(store.clone(), StoreData { store: store.clone() });
//! let key = wrapped.invoke(&["payload".into()]).await?;
//!
//! // 3. Replay the history
//! let trace = ReplayLog::new(store).replay("Cache.store").await?;
//! println!("{}", trace);
//! ```
//!
//! ## Fetch Caching
//!
//! ```ignore
//! use trace_kit::{FetchCache, fetch::HttpFetcher, store::InMemoryStore};
//!
//! let cache = FetchCache::new(InMemoryStore::new(), HttpFetcher::new());
//! let body = cache.get("http://example.com").await?;      // fetches
//! let again = cache.get("http://example.com").await?;     // cache hit
//! assert_eq!(cache.access_count("http://example.com").await?, 2);
//! ```

#[macro_use]
extern crate log;

pub mod error;
pub mod fetch;
pub mod instrument;
pub mod key;
pub mod op;
pub mod reader;
pub mod replay;
pub mod serialization;
pub mod store;

// Re-exports for convenience
pub use error::{Error, Result};
pub use fetch::{FetchCache, Fetcher};
pub use instrument::{CallCounter, CallHistory, InstrumentedStore};
pub use key::KeyBuilder;
pub use op::StoreOp;
pub use reader::TypedReader;
pub use replay::ReplayLog;
pub use serialization::ArgValue;
pub use store::KvStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
