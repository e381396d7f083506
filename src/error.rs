//! Error types for the instrumentation framework.

use std::fmt;

/// Result type for store and wrapper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for trace-kit.
///
/// All operations return `Result<T>` where `Result` is defined as `std::result::Result<T, Error>`.
/// Different error variants represent different failure modes:
#[derive(Debug, Clone)]
pub enum Error {
    /// Backing store unreachable or timed out.
    ///
    /// Common causes:
    /// - Redis connection lost
    /// - Network timeout
    /// - Pool exhausted
    ///
    /// Propagated to the caller, never retried internally. Log entries already
    /// written before the failure stay written.
    StoreUnavailable(String),

    /// Operation applied to a key holding the wrong value kind.
    ///
    /// Raised when e.g. `increment` hits a list key or `get` hits a list key.
    /// Mirrors the Redis WRONGTYPE error.
    WrongType(String),

    /// Serialization failed when encoding an argument record.
    ///
    /// This occurs when Postcard encoding of the argument list fails.
    /// The call is still considered to have happened if side effects already occurred.
    SerializationError(String),

    /// Deserialization failed when decoding a history record.
    ///
    /// This indicates corrupted or malformed data in the store.
    ///
    /// **Recovery:** The history entry cannot be rendered; inspect the store directly.
    DeserializationError(String),

    /// A stored value is not in the expected form.
    ///
    /// Raised when a counter key holds non-UTF-8 or non-numeric bytes, or a
    /// typed read finds bytes that do not parse as the requested type.
    /// Output history entries are exempt: replay renders them lossily rather
    /// than failing the whole trace over one bad entry.
    InvalidRecord(String),

    /// Record envelope version mismatch between code and stored history.
    ///
    /// Raised when `CURRENT_RECORD_VERSION` changed between writes and reads.
    /// History written under an older schema is not silently migrated.
    VersionMismatch {
        /// Expected record version (from compiled code)
        expected: u32,
        /// Found record version (from the stored record)
        found: u32,
    },

    /// Transport-level failure in a fetch operation.
    ///
    /// Common causes:
    /// - DNS or connection failure
    /// - Non-success HTTP status
    ///
    /// Propagated to the caller; no cache entry is written. The access counter
    /// has still been incremented (an attempt was made).
    FetchFailed(String),

    /// Feature not implemented or not enabled.
    ///
    /// Common causes:
    /// - Cargo feature not enabled (e.g., "redis" for RedisStore)
    NotImplemented(String),

    /// Configuration error during store initialization.
    ///
    /// Common causes:
    /// - Invalid connection string
    /// - Invalid pool size
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Error::WrongType(msg) => write!(f, "Wrong value type: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Record version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::StoreUnavailable(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::StoreUnavailable(format!("Redis error: {}", e))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::FetchFailed(e.to_string())
    }
}
