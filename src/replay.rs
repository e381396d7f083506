//! Human-readable replay of recorded operation history.

use crate::error::{Error, Result};
use crate::key::KeyBuilder;
use crate::serialization::{decode_args, render_args};
use crate::store::KvStore;

/// Read-only view over an operation's recorded calls.
///
/// Renders the call counter and input/output history written by the
/// instrumentation layers as a trace, one line per recorded call:
///
/// ```text
/// Cache.store was called 2 times:
/// Cache.store(*('a',)) -> 1
/// Cache.store(*('b',)) -> 2
/// ```
///
/// Pure read, no side effects; replaying twice with no intervening calls
/// produces identical output. No ordering guarantee beyond store insertion
/// order.
pub struct ReplayLog<S: KvStore> {
    store: S,
}

impl<S: KvStore> ReplayLog<S> {
    /// Create a replay view over `store`.
    pub fn new(store: S) -> Self {
        ReplayLog { store }
    }

    /// Total recorded call count for `op`; an absent counter reads as 0.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRecord` if the counter holds non-numeric bytes
    /// - `Error::StoreUnavailable` if the store is unreachable
    pub async fn call_count(&self, op: &str) -> Result<u64> {
        match self.store.get(&KeyBuilder::call_count(op)).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    Error::InvalidRecord(format!("counter for {} is not UTF-8: {}", op, e))
                })?;
                text.parse::<u64>().map_err(|e| {
                    Error::InvalidRecord(format!("counter for {} is not numeric: {}", op, e))
                })
            }
            None => Ok(0),
        }
    }

    /// Render the full trace for `op`.
    ///
    /// Emits a summary line with the total call count, then one line per
    /// index i of the history logs. If the logs have unequal lengths (the
    /// crash window between appends and the counter increment), iteration
    /// stops at the shorter log instead of failing.
    ///
    /// # Errors
    ///
    /// - `Error::DeserializationError` / `Error::InvalidRecord` /
    ///   `Error::VersionMismatch` if a history record cannot be decoded
    /// - `Error::StoreUnavailable` if the store is unreachable
    pub async fn replay(&self, op: &str) -> Result<String> {
        let calls = self.call_count(op).await?;

        let inputs = self
            .store
            .list_range(&KeyBuilder::inputs_log(op), 0, -1)
            .await?;
        let outputs = self
            .store
            .list_range(&KeyBuilder::outputs_log(op), 0, -1)
            .await?;

        let paired = inputs.len().min(outputs.len());
        if inputs.len() != outputs.len() {
            warn!(
                "History logs for {} have unequal lengths ({} inputs, {} outputs), replaying {}",
                op,
                inputs.len(),
                outputs.len(),
                paired
            );
        }

        let mut lines = Vec::with_capacity(paired + 1);
        lines.push(format!("{} was called {} times:", op, calls));

        for i in 0..paired {
            let args = decode_args(&inputs[i])?;
            let output = String::from_utf8_lossy(&outputs[i]);
            lines.push(format!("{}(*{}) -> {}", op, render_args(&args), output));
        }

        Ok(lines.join("\n"))
    }
}
