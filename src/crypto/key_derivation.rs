//! Wallet-Signature Key Derivation
//!
//! Turns an opaque wallet signature into a 256-bit AES key. The signature is
//! the per-user secret: only the wallet owner can reproduce it, so only the
//! owner can ever re-derive the key. The key itself is never transmitted or
//! persisted.
//!
//! Derivation is PBKDF2-HMAC-SHA256 over the first 64 bytes of the signature
//! with a fixed application salt and iteration count. Same signature in,
//! same key out, on every client.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;

use super::error::CryptoError;

/// Signature prefix length used as key material
pub const KEY_MATERIAL_LEN: usize = 64;

/// Fixed application salt for PBKDF2
const SALT: &[u8] = b"memorychain-salt-v1";

/// PBKDF2 iteration count
const ITERATIONS: u32 = 100_000;

/// An opaque 256-bit symmetric key
///
/// Usable only for AES-256-GCM encrypt/decrypt. Deliberately has no serde
/// support and a redacted `Debug` impl so it cannot leak into logs or
/// durable storage; keep it in a [`crate::session::KeyCache`] at most.
#[derive(Clone)]
pub struct MemoryKey([u8; 32]);

impl MemoryKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MemoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemoryKey(..)")
    }
}

/// Derive an encryption key from wallet signature material
///
/// Deterministic: the same signature always yields the same key.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivationFailed` if the signature is shorter
/// than [`KEY_MATERIAL_LEN`] bytes.
pub fn derive_key(signature: &str) -> Result<MemoryKey, CryptoError> {
    let material = signature.as_bytes();
    if material.len() < KEY_MATERIAL_LEN {
        return Err(CryptoError::KeyDerivationFailed(format!(
            "signature material too short: expected at least {} bytes, got {}",
            KEY_MATERIAL_LEN,
            material.len()
        )));
    }

    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(&material[..KEY_MATERIAL_LEN], SALT, ITERATIONS, &mut key);
    Ok(MemoryKey(key))
}

/// The canonical message a wallet signs to derive its encryption key
///
/// The exact text matters: a different message produces a different
/// signature and therefore a different key.
pub fn signing_message(address: &str) -> String {
    format!(
        "DeMemo Authentication\n\nSign this message to encrypt your AI memories.\n\nWallet: {}\n\nThis signature will be used to derive your personal encryption key. Your memories can only be decrypted by you.",
        address
    )
}
