//! Encryption primitives for wallet-owned memories
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA256 over a wallet signature prefix,
//!   producing a 256-bit AES key only the signer can reproduce
//! - **Cipher**: AES-256-GCM over the JSON form of a conversation, fresh
//!   random 96-bit IV per call
//!
//! Keys live in memory only. Nothing in this module performs I/O.

pub mod cipher;
pub mod error;
pub mod key_derivation;

pub use cipher::{decrypt_conversation, encrypt_conversation, IV_LEN};
pub use error::CryptoError;
pub use key_derivation::{derive_key, signing_message, MemoryKey, KEY_MATERIAL_LEN};
