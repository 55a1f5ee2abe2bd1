//! Codec trait and implementations for serializing/deserializing records.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The persistence layer doesn't care HOW entities are serialized; it
//! just needs something that implements the [`Codec`] trait.
//!
//! Currently we provide [`JsonCodec`]: records on disk stay
//! human-readable, so a builder can inspect or hand-fix a room file.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between session tasks (every entity
///   write persists through the same codec, from any thread).
/// - `'static` → the codec owns everything it needs.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use warren_protocol::{Codec, Coordinate, JsonCodec};
///
/// let codec = JsonCodec;
/// let here = Coordinate::new(1, -2, 0);
///
/// let bytes = codec.encode(&here).unwrap();
/// let back: Coordinate = codec.decode(&bytes).unwrap();
/// assert_eq!(here, back);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        // Pretty output: record files are meant to be read by humans too.
        serde_json::to_vec_pretty(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
