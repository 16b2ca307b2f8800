//! Transport-safe byte encoding
//!
//! Standard base64 between raw buffers (ciphertext, IV) and text suitable
//! for JSON embedding. Round-trip law: `decode(encode(b)) == b` for every
//! byte sequence, including the empty one.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Input to `decode` contained non-base64 characters or bad padding
    #[error("invalid base64 input: {0}")]
    InvalidBase64(String),

    /// Envelope JSON could not be produced or parsed
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Encode bytes as standard base64 text
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text back to bytes
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(text)
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))
}
