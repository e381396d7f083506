//! Store operation trait that instrumentation layers compose over.

use crate::error::Result;
use crate::serialization::ArgValue;

/// Trait for a wrapped store operation.
///
/// An operation takes an argument list and returns a string result (for a
/// "store this value" operation, the generated key). Instrumentation layers
/// implement this same trait and hold the next layer, forming an explicit
/// chain: apply counting, history logging, either, both, or neither, in any
/// order.
///
/// # Example
///
/// ```no_run
/// use trace_kit::op::StoreOp;
/// use trace_kit::serialization::ArgValue;
/// use trace_kit::store::{InMemoryStore, KvStore};
/// use trace_kit::error::{Error, Result};
///
/// /// Stores the argument under a generated key and returns the key.
/// #[derive(Clone)]
/// struct StoreData {
///     store: InMemoryStore,
/// }
///
/// impl StoreOp for StoreData {
///     fn name(&self) -> &str {
///         "Cache.store"
///     }
///
///     async fn invoke(&self, args: &[ArgValue]) -> Result<String> {
///         let ArgValue::Str(data) = &args[0] else {
///             return Err(Error::InvalidRecord("expected string data".into()));
///         };
///         let key = format!("data-{}", data.len());
///         self.store.set(&key, data.clone().into_bytes()).await?;
///         Ok(key)
///     }
/// }
/// ```
#[allow(async_fn_in_trait)]
pub trait StoreOp: Send + Sync {
    /// Stable identity for this operation.
    ///
    /// Used as the namespace for its call counter and history logs, so it
    /// must be unique per wrapped operation within a store instance.
    /// Analogous to a fully-qualified function name.
    fn name(&self) -> &str;

    /// Invoke the operation with the given arguments.
    async fn invoke(&self, args: &[ArgValue]) -> Result<String>;
}
