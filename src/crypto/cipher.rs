//! AES-256-GCM Conversation Encryption
//!
//! Authenticated encryption of conversations with a wallet-derived key.
//!
//! **Format**:
//! - IV: 12 bytes (96 bits), freshly random per call, returned alongside the
//!   ciphertext and never caller-supplied
//! - Ciphertext: encrypted JSON bytes with the 16-byte authentication tag
//!   appended
//! - No Additional Authenticated Data

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::error::CryptoError;
use super::key_derivation::MemoryKey;
use crate::types::Conversation;

/// GCM IV length in bytes
pub const IV_LEN: usize = 12;

/// Encrypt a conversation, returning ciphertext and the IV used
///
/// Serializes the conversation to JSON, draws a fresh random 96-bit IV, and
/// encrypts with AES-256-GCM. A new IV is generated on every call so the
/// same key never sees a repeated (IV, plaintext) pair.
pub fn encrypt_conversation(
    conversation: &Conversation,
    key: &MemoryKey,
) -> Result<(Vec<u8>, [u8; IV_LEN]), CryptoError> {
    let plaintext = serde_json::to_vec(conversation)
        .map_err(|e| CryptoError::EncryptionFailed(format!("serialization error: {}", e)))?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(format!("failed to create cipher: {}", e)))?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: &plaintext,
                aad: b"",
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, iv))
}

/// Decrypt and parse a conversation
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` if:
/// - The IV is not 12 bytes
/// - Authentication tag verification fails (wrong key or tampered data)
/// - The recovered plaintext is not a valid conversation
pub fn decrypt_conversation(
    ciphertext: &[u8],
    iv: &[u8],
    key: &MemoryKey,
) -> Result<Conversation, CryptoError> {
    if iv.len() != IV_LEN {
        return Err(CryptoError::DecryptionFailed(format!(
            "invalid IV size: expected {} bytes, got {}",
            IV_LEN,
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::DecryptionFailed(format!("failed to create cipher: {}", e)))?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(iv),
            Payload {
                msg: ciphertext,
                aad: b"",
            },
        )
        .map_err(|_| {
            CryptoError::DecryptionFailed(
                "authentication tag mismatch (wrong key or corrupted data)".to_string(),
            )
        })?;

    serde_json::from_slice(&plaintext).map_err(|e| {
        CryptoError::DecryptionFailed(format!("recovered bytes are not a valid conversation: {}", e))
    })
}
