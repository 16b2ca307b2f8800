//! Crypto error types
//!
//! Every failure in the key-derivation and cipher paths maps to one of
//! these variants. Parse failures after a successful decrypt fold into
//! `DecryptionFailed` as well; callers treat the whole class as "this
//! memory is unreadable", never as a crash.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Signature material was empty or shorter than the required prefix
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(String),

    /// Serialization or cipher failure on the encrypt path
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication tag mismatch, wrong key, corrupted ciphertext, or
    /// unparseable plaintext after decryption
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}
