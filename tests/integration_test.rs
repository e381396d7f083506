//! Integration tests for trace-kit
//!
//! These tests verify end-to-end instrumentation, replay, and fetch-caching
//! behavior across all components.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use trace_kit::serialization::{decode_args, ArgValue};
use trace_kit::store::{InMemoryStore, KvStore};
use trace_kit::{
    CallCounter, CallHistory, Error, FetchCache, Fetcher, InstrumentedStore, KeyBuilder,
    ReplayLog, Result, StoreOp, TypedReader,
};

/// Capture the crate's log output under `cargo test` (RUST_LOG to enable).
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Stores its first argument under a generated key and returns the key,
/// mirroring a "store this value, get a key back" operation.
#[derive(Clone)]
struct StoreData {
    store: InMemoryStore,
}

impl StoreOp for StoreData {
    fn name(&self) -> &str {
        "Cache.store"
    }

    async fn invoke(&self, args: &[ArgValue]) -> Result<String> {
        let Some(ArgValue::Str(data)) = args.first() else {
            return Err(Error::InvalidRecord("expected string data".into()));
        };
        let key = uuid::Uuid::new_v4().to_string();
        self.store.set(&key, data.clone().into_bytes()).await?;
        Ok(key)
    }
}

/// A result that is just the running call number, for exact-trace assertions.
struct SequenceOp {
    calls: AtomicUsize,
}

impl SequenceOp {
    fn new() -> Self {
        SequenceOp {
            calls: AtomicUsize::new(0),
        }
    }
}

impl StoreOp for SequenceOp {
    fn name(&self) -> &str {
        "op"
    }

    async fn invoke(&self, _args: &[ArgValue]) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(n.to_string())
    }
}

/// Test 1: End-to-End Instrumentation Flow
///
/// Verifies the complete flow for N distinct calls:
/// - Counter equals N
/// - Both history logs have exactly N entries
/// - inputs[i]/outputs[i] correspond to the i-th call's argument/result
#[tokio::test]
async fn test_end_to_end_instrumentation_flow() {
    init_logging();
    let store = InMemoryStore::new();
    let wrapped = InstrumentedStore::new(store.clone(), StoreData {
        store: store.clone(),
    });

    let mut returned_keys = Vec::new();
    for i in 0..5 {
        let key = wrapped
            .invoke(&[format!("payload-{}", i).into()])
            .await
            .expect("Instrumented call should succeed");
        returned_keys.push(key);
    }

    // Counter equals N
    let count = store
        .get(&KeyBuilder::call_count("Cache.store"))
        .await
        .expect("Counter read should not error");
    assert_eq!(count, Some(b"5".to_vec()));

    // Both logs have exactly N entries
    let inputs = store
        .list_range(&KeyBuilder::inputs_log("Cache.store"), 0, -1)
        .await
        .expect("Inputs read should not error");
    let outputs = store
        .list_range(&KeyBuilder::outputs_log("Cache.store"), 0, -1)
        .await
        .expect("Outputs read should not error");
    assert_eq!(inputs.len(), 5);
    assert_eq!(outputs.len(), 5);

    // inputs[i]/outputs[i] correspond to the i-th call
    for (i, (input, output)) in inputs.iter().zip(outputs.iter()).enumerate() {
        let args = decode_args(input).expect("Input record should decode");
        assert_eq!(args, vec![ArgValue::Str(format!("payload-{}", i))]);
        assert_eq!(output, &returned_keys[i].clone().into_bytes());
    }

    // The wrapped operation's own effect happened: each returned key resolves
    let reader = TypedReader::new(store);
    for (i, key) in returned_keys.iter().enumerate() {
        let stored = reader.read_str(key).await.expect("Read should not error");
        assert_eq!(stored, Some(format!("payload-{}", i)));
    }
}

/// Test 2: Exact Replay Format
///
/// An operation called with ("a",) then ("b",) returning "1" then "2"
/// replays as a count line showing 2, then the two call lines.
#[tokio::test]
async fn test_replay_exact_trace() {
    init_logging();
    let store = InMemoryStore::new();
    let wrapped = InstrumentedStore::new(store.clone(), SequenceOp::new());

    wrapped.invoke(&["a".into()]).await.expect("Call should succeed");
    wrapped.invoke(&["b".into()]).await.expect("Call should succeed");

    let replay = ReplayLog::new(store);
    let trace = replay.replay("op").await.expect("Replay should succeed");

    assert_eq!(
        trace,
        "op was called 2 times:\nop(*('a',)) -> 1\nop(*('b',)) -> 2"
    );

    // Idempotence: replaying again with no intervening calls is identical
    let again = replay.replay("op").await.expect("Replay should succeed");
    assert_eq!(trace, again);
}

/// Test 3: Independent Layer Composition
///
/// Counting without history and history without counting both work, and
/// each side effect happens exactly once per call.
#[tokio::test]
async fn test_layers_apply_independently() {
    init_logging();

    // Counting only
    let store = InMemoryStore::new();
    let counted = CallCounter::new(store.clone(), SequenceOp::new());
    counted.invoke(&["x".into()]).await.expect("Call should succeed");
    counted.invoke(&["y".into()]).await.expect("Call should succeed");

    assert_eq!(
        store.get("op").await.expect("Counter read should not error"),
        Some(b"2".to_vec())
    );
    assert!(store
        .list_range("op:inputs", 0, -1)
        .await
        .expect("Inputs read should not error")
        .is_empty());

    // History only
    let store2 = InMemoryStore::new();
    let logged = CallHistory::new(store2.clone(), SequenceOp::new());
    logged.invoke(&["x".into()]).await.expect("Call should succeed");

    assert_eq!(
        store2.get("op").await.expect("Counter read should not error"),
        None
    );
    assert_eq!(
        store2
            .list_range("op:inputs", 0, -1)
            .await
            .expect("Inputs read should not error")
            .len(),
        1
    );
}

/// Test 4: Flush Resets Everything
///
/// After a store flush, counters and histories are gone and replay reports
/// zero calls with no lines.
#[tokio::test]
async fn test_flush_resets_counters_and_history() {
    init_logging();
    let store = InMemoryStore::new();
    let wrapped = InstrumentedStore::new(store.clone(), SequenceOp::new());

    wrapped.invoke(&["a".into()]).await.expect("Call should succeed");
    wrapped.invoke(&["b".into()]).await.expect("Call should succeed");

    store.flush().await.expect("Flush should succeed");

    let replay = ReplayLog::new(store);
    let trace = replay.replay("op").await.expect("Replay should succeed");
    assert_eq!(trace, "op was called 0 times:");
}

/// Test 5: Concurrent Instrumented Calls
///
/// The per-identity lock keeps inputs[i]/outputs[i] paired under concurrency
/// and the final counter equals the number of calls.
#[tokio::test]
async fn test_concurrent_instrumented_calls() {
    init_logging();
    let store = InMemoryStore::new();
    let wrapped = Arc::new(InstrumentedStore::new(store.clone(), StoreData {
        store: store.clone(),
    }));

    let mut handles = vec![];
    for i in 0..32 {
        let wrapped = Arc::clone(&wrapped);
        handles.push(tokio::spawn(async move {
            wrapped
                .invoke(&[format!("payload-{}", i).into()])
                .await
                .expect("Instrumented call should succeed")
        }));
    }
    for handle in handles {
        handle.await.expect("Task should not panic");
    }

    let inputs = store
        .list_range(&KeyBuilder::inputs_log("Cache.store"), 0, -1)
        .await
        .expect("Inputs read should not error");
    let outputs = store
        .list_range(&KeyBuilder::outputs_log("Cache.store"), 0, -1)
        .await
        .expect("Outputs read should not error");
    assert_eq!(inputs.len(), 32);
    assert_eq!(outputs.len(), 32);

    let count = store
        .get(&KeyBuilder::call_count("Cache.store"))
        .await
        .expect("Counter read should not error");
    assert_eq!(count, Some(b"32".to_vec()));

    // Every input's payload must be retrievable via its paired output key.
    let reader = TypedReader::new(store);
    for (input, output) in inputs.iter().zip(outputs.iter()) {
        let args = decode_args(input).expect("Input record should decode");
        let ArgValue::Str(payload) = &args[0] else {
            panic!("expected string payload");
        };
        let key = String::from_utf8(output.clone()).expect("Output should be UTF-8");
        let stored = reader.read_str(&key).await.expect("Read should not error");
        assert_eq!(stored.as_deref(), Some(payload.as_str()));
    }
}

// =============================================================================
// Fetch cache end-to-end
// =============================================================================

struct FlakyFetcher {
    fetches: Arc<AtomicUsize>,
    fail_after: usize,
}

impl Fetcher for FlakyFetcher {
    async fn fetch(&self, key: &str) -> Result<String> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if n > self.fail_after {
            return Err(Error::FetchFailed(format!("network down for {}", key)));
        }
        Ok(format!("content of {} v{}", key, n))
    }
}

/// Test 6: Fetch Cache Hit/Miss Lifecycle
///
/// First fetch invokes the transport once; a second within TTL serves the
/// identical value with zero extra transport calls; after expiry the value
/// is refetched and replaced. The access counter tracks every attempt.
#[tokio::test]
async fn test_fetch_cache_lifecycle() {
    init_logging();
    let fetches = Arc::new(AtomicUsize::new(0));
    let cache = FetchCache::new(
        InMemoryStore::new(),
        FlakyFetcher {
            fetches: fetches.clone(),
            fail_after: usize::MAX,
        },
    )
    .with_ttl(Duration::from_millis(100));

    let first = cache.get("x").await.expect("Fetch should succeed");
    let second = cache.get("x").await.expect("Fetch should succeed");
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(
        cache.access_count("x").await.expect("Count should not error"),
        2
    );

    tokio::time::sleep(Duration::from_millis(150)).await;

    let third = cache.get("x").await.expect("Fetch should succeed");
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_ne!(third, first);
    assert_eq!(
        cache.access_count("x").await.expect("Count should not error"),
        3
    );
}

/// Test 7: Fetch Failure Propagation
///
/// A failing transport propagates the error, writes no cache entry, and the
/// attempt is still counted.
#[tokio::test]
async fn test_fetch_failure_propagates() {
    init_logging();
    let store = InMemoryStore::new();
    let cache = FetchCache::new(
        store.clone(),
        FlakyFetcher {
            fetches: Arc::new(AtomicUsize::new(0)),
            fail_after: 1,
        },
    )
    .with_ttl(Duration::from_millis(50));

    // First fetch succeeds and caches.
    let body = cache.get("x").await.expect("Fetch should succeed");
    assert_eq!(body, "content of x v1");

    // Let the entry expire, then the transport starts failing.
    tokio::time::sleep(Duration::from_millis(80)).await;

    let result = cache.get("x").await;
    assert!(matches!(result, Err(Error::FetchFailed(_))));

    // No new cache entry was written.
    assert_eq!(
        store
            .get(&KeyBuilder::fetch_body("x"))
            .await
            .expect("Get should not error"),
        None
    );

    // Both attempts counted.
    assert_eq!(
        cache.access_count("x").await.expect("Count should not error"),
        2
    );
}

/// Test 8: Instrumentation and Fetch Cache Share One Store
///
/// Different key namespaces coexist in a single store without collisions.
#[tokio::test]
async fn test_shared_store_namespaces() {
    init_logging();
    let store = InMemoryStore::new();

    let wrapped = InstrumentedStore::new(store.clone(), SequenceOp::new());
    wrapped.invoke(&["a".into()]).await.expect("Call should succeed");

    let cache = FetchCache::new(
        store.clone(),
        FlakyFetcher {
            fetches: Arc::new(AtomicUsize::new(0)),
            fail_after: usize::MAX,
        },
    );
    cache.get("op").await.expect("Fetch should succeed");

    // The fetch for resource "op" must not disturb the operation named "op".
    let replay = ReplayLog::new(store.clone());
    let trace = replay.replay("op").await.expect("Replay should succeed");
    assert_eq!(trace, "op was called 1 times:\nop(*('a',)) -> 1");

    assert_eq!(
        cache.access_count("op").await.expect("Count should not error"),
        1
    );
}
