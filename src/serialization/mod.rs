//! Postcard-based argument records with versioned envelopes.
//!
//! History logs must survive schema evolution and type drift across the
//! processes that write and read them, so argument lists are not stored as
//! ad-hoc display strings. Every inputs-log entry is a tagged [`ArgValue`]
//! list wrapped in a versioned envelope:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (4 bytes)│POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "TKIT"              u32 (LE)        postcard::to_allocvec(args)
//! ```
//!
//! The display form used by replay rendering is derived from the decoded
//! values, never stored, so the wire encoding and the human trace can evolve
//! independently.
//!
//! # Example
//!
//! ```rust
//! use trace_kit::serialization::{encode_args, decode_args, render_args, ArgValue};
//!
//! # fn main() -> trace_kit::Result<()> {
//! let args = vec![ArgValue::Str("a".into()), ArgValue::Int(7)];
//!
//! let bytes = encode_args(&args)?;
//! let decoded = decode_args(&bytes)?;
//! assert_eq!(args, decoded);
//! assert_eq!(render_args(&decoded), "('a', 7)");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magic header for trace-kit history records: b"TKIT"
///
/// Any record without this magic is rejected during decoding.
pub const RECORD_MAGIC: [u8; 4] = *b"TKIT";

/// Current record schema version.
///
/// Increment when making breaking changes to [`ArgValue`] or the envelope
/// layout. Records written under an older version are rejected with
/// `Error::VersionMismatch` rather than silently misread.
pub const CURRENT_RECORD_VERSION: u32 = 1;

/// A single serialized argument.
///
/// The tagged encoding keeps argument types unambiguous in the history log;
/// a stored `"1"` and a stored `1` stay distinguishable forever.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// UTF-8 string argument.
    Str(String),
    /// Signed integer argument.
    Int(i64),
    /// Floating point argument.
    Float(f64),
    /// Raw byte argument.
    Bytes(Vec<u8>),
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::Str(s)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        ArgValue::Float(x)
    }
}

impl From<Vec<u8>> for ArgValue {
    fn from(b: Vec<u8>) -> Self {
        ArgValue::Bytes(b)
    }
}

impl fmt::Display for ArgValue {
    /// Display-stable rendering used in replay traces.
    ///
    /// Strings are single-quoted, numbers render bare, bytes render as
    /// `b'..'` with non-printable bytes escaped as `\xNN`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                write!(f, "'")
            }
            ArgValue::Int(i) => write!(f, "{}", i),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::Bytes(b) => {
                write!(f, "b'")?;
                for &byte in b {
                    match byte {
                        b'\'' => write!(f, "\\'")?,
                        b'\\' => write!(f, "\\\\")?,
                        0x20..=0x7e => write!(f, "{}", byte as char)?,
                        _ => write!(f, "\\x{:02x}", byte)?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

/// Render an argument list as a display-stable tuple.
///
/// A single argument keeps the trailing comma so one-element and
/// zero-element tuples stay distinguishable in traces: `('a',)` vs `()`.
pub fn render_args(args: &[ArgValue]) -> String {
    match args {
        [] => "()".to_string(),
        [only] => format!("({},)", only),
        many => {
            let parts: Vec<String> = many.iter().map(|a| a.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Versioned envelope for history records.
///
/// Every inputs-log entry is wrapped in this envelope to enable:
/// - **Corruption detection:** Invalid magic → reject record
/// - **Schema evolution:** Version mismatch → reject, never misread
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordEnvelope<T> {
    /// Magic header: must be b"TKIT"
    pub magic: [u8; 4],
    /// Record version: must match CURRENT_RECORD_VERSION
    pub version: u32,
    /// The actual record payload
    pub payload: T,
}

impl<T> RecordEnvelope<T> {
    /// Create a new envelope with current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: RECORD_MAGIC,
            version: CURRENT_RECORD_VERSION,
            payload,
        }
    }
}

/// Encode an argument list for the inputs log.
///
/// This is the canonical encoding for all history storage in trace-kit.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard encoding fails.
pub fn encode_args(args: &[ArgValue]) -> Result<Vec<u8>> {
    let envelope = RecordEnvelope::new(args);
    postcard::to_allocvec(&envelope).map_err(|e| {
        log::error!("Argument record encoding failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode an argument list from an inputs-log entry with validation.
///
/// Validation order:
/// 1. Postcard envelope decodes
/// 2. Magic header matches b"TKIT"
/// 3. Version matches CURRENT_RECORD_VERSION
///
/// # Errors
///
/// - `Error::DeserializationError`: Corrupted Postcard payload
/// - `Error::InvalidRecord`: Invalid magic header
/// - `Error::VersionMismatch`: Record version mismatch
pub fn decode_args(bytes: &[u8]) -> Result<Vec<ArgValue>> {
    let envelope: RecordEnvelope<Vec<ArgValue>> = postcard::from_bytes(bytes).map_err(|e| {
        log::error!("Argument record decoding failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != RECORD_MAGIC {
        log::warn!(
            "Invalid history record: expected magic {:?}, got {:?}",
            RECORD_MAGIC,
            envelope.magic
        );
        return Err(Error::InvalidRecord(format!(
            "Invalid magic: expected {:?}, got {:?}",
            RECORD_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_RECORD_VERSION {
        log::warn!(
            "Record version mismatch: expected {}, got {}",
            CURRENT_RECORD_VERSION,
            envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_RECORD_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
