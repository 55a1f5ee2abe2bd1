//! Error types for the protocol layer.
//!
//! Each crate in Warren defines its own error enum. A `ProtocolError`
//! always means the problem is in parsing or (de)serialization, never in
//! locking, storage, or networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a truncated record file, a record written by an
    /// incompatible version, or a record of the wrong kind.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The text does not name a direction (`n`, `north`, `ne`, ...).
    #[error("not a valid direction: {0:?}")]
    InvalidDirection(String),
}
