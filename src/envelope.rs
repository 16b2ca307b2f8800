//! Encrypted Envelope Wire Format
//!
//! The envelope is the JSON blob stored at the pinning service and referenced
//! by CID ever after. Its exact shape is the compatibility contract between
//! clients:
//!
//! ```json
//! {
//!   "encryptedData": "<base64 ciphertext>",
//!   "iv": "<base64 12-byte IV>",
//!   "timestamp": 1700000000000,
//!   "version": "1.0.0",
//!   "walletAddress": "0x..."
//! }
//! ```
//!
//! Envelopes are immutable once sealed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};

/// Current envelope format version
pub const ENVELOPE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// Base64-encoded ciphertext (authentication tag included)
    pub encrypted_data: String,
    /// Base64-encoded 12-byte initialization vector
    pub iv: String,
    /// Creation time, milliseconds since epoch
    pub timestamp: i64,
    /// Format version string
    pub version: String,
    /// Owning wallet address
    pub wallet_address: String,
}

impl EncryptedEnvelope {
    /// Assemble an envelope around freshly encrypted bytes
    pub fn seal(ciphertext: &[u8], iv: &[u8], wallet_address: &str) -> Self {
        Self {
            encrypted_data: codec::encode(ciphertext),
            iv: codec::encode(iv),
            timestamp: Utc::now().timestamp_millis(),
            version: ENVELOPE_VERSION.to_string(),
            wallet_address: wallet_address.to_string(),
        }
    }

    /// Recover the raw ciphertext and IV
    pub fn open(&self) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
        let ciphertext = codec::decode(&self.encrypted_data)?;
        let iv = codec::decode(&self.iv)?;
        Ok((ciphertext, iv))
    }

    /// Serialize to the JSON bytes that get pinned
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
    }

    /// Parse an envelope fetched from storage
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::MalformedEnvelope(e.to_string()))
    }
}
