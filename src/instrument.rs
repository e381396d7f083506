//! Composable instrumentation layers over store operations.
//!
//! Two independent layers, each implementing [`StoreOp`] and wrapping the
//! next one in the chain:
//!
//! - [`CallCounter`]: counts invocations per operation identity
//! - [`CallHistory`]: appends argument/result records to per-identity logs
//!
//! [`InstrumentedStore`] composes both and serializes the whole per-call
//! store sequence under an async mutex, which keeps the inputs and outputs
//! logs index-aligned across concurrent callers. With the bare layers,
//! store-level atomicity holds per sub-step only and concurrent callers may
//! interleave their appends.
//!
//! The instrumented operation's external contract is unchanged: same
//! arguments in, same result out.

use crate::error::Result;
use crate::key::KeyBuilder;
use crate::op::StoreOp;
use crate::serialization::{encode_args, ArgValue};
use crate::store::KvStore;
use tokio::sync::Mutex;

/// Counts invocations of the wrapped operation.
///
/// The counter lives in the backing store under the operation identity and
/// increments after the wrapped call returns, once per successful call. It
/// never decrements; only a store `flush` resets it.
pub struct CallCounter<S: KvStore, O: StoreOp> {
    store: S,
    inner: O,
}

impl<S: KvStore, O: StoreOp> CallCounter<S, O> {
    /// Wrap `inner` so its invocations are counted in `store`.
    pub fn new(store: S, inner: O) -> Self {
        CallCounter { store, inner }
    }
}

impl<S: KvStore, O: StoreOp> StoreOp for CallCounter<S, O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, args: &[ArgValue]) -> Result<String> {
        let result = self.inner.invoke(args).await?;

        // A crash before this line leaves the counter lagging any history the
        // inner chain wrote. Accepted inconsistency window, not corrected.
        let count = self
            .store
            .increment(&KeyBuilder::call_count(self.inner.name()))
            .await?;
        debug!("Counted call {} of {}", count, self.inner.name());

        Ok(result)
    }
}

/// Records argument and result history for the wrapped operation.
///
/// Arguments are encoded as versioned records into `{name}:inputs`, results
/// as raw UTF-8 into `{name}:outputs`, appended in call order. Entry `i` of
/// both logs belongs to the same call. Once an append succeeds it is never
/// rolled back, even if a later step in the same call fails.
pub struct CallHistory<S: KvStore, O: StoreOp> {
    store: S,
    inner: O,
}

impl<S: KvStore, O: StoreOp> CallHistory<S, O> {
    /// Wrap `inner` so its arguments and results are logged to `store`.
    pub fn new(store: S, inner: O) -> Self {
        CallHistory { store, inner }
    }
}

impl<S: KvStore, O: StoreOp> StoreOp for CallHistory<S, O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn invoke(&self, args: &[ArgValue]) -> Result<String> {
        // Encode before any write so a SerializationError leaves no entry.
        let record = encode_args(args)?;

        let name = self.inner.name();
        self.store
            .list_append(&KeyBuilder::inputs_log(name), record)
            .await?;

        let result = self.inner.invoke(args).await?;

        self.store
            .list_append(&KeyBuilder::outputs_log(name), result.clone().into_bytes())
            .await?;
        debug!("Recorded call of {} in history", name);

        Ok(result)
    }
}

/// Fully instrumented operation: history logging plus counting, with the
/// whole per-call store sequence serialized under an async mutex.
///
/// One `InstrumentedStore` is the sole wrapper for its operation identity;
/// the lock therefore serializes all callers of that identity and keeps
/// `inputs[i]`/`outputs[i]` paired to the i-th call even under concurrency.
///
/// # Example
///
/// ```ignore
/// use trace_kit::{InstrumentedStore, store::InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let wrapped = InstrumentedStore::new(store.clone(), StoreData { store });
///
/// let key = wrapped.invoke(&["payload".into()]).await?;
/// ```
pub struct InstrumentedStore<S: KvStore, O: StoreOp> {
    chain: CallCounter<S, CallHistory<S, O>>,
    lock: Mutex<()>,
}

impl<S: KvStore, O: StoreOp> InstrumentedStore<S, O> {
    /// Wrap `inner` with history logging and call counting backed by `store`.
    pub fn new(store: S, inner: O) -> Self {
        let chain = CallCounter::new(store.clone(), CallHistory::new(store, inner));
        InstrumentedStore {
            chain,
            lock: Mutex::new(()),
        }
    }
}

impl<S: KvStore, O: StoreOp> StoreOp for InstrumentedStore<S, O> {
    fn name(&self) -> &str {
        self.chain.name()
    }

    async fn invoke(&self, args: &[ArgValue]) -> Result<String> {
        let _guard = self.lock.lock().await;
        self.chain.invoke(args).await
    }
}
