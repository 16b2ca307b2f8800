//! DeMemo core: the encrypted-memory round-trip protocol
//!
//! Lets a chat client persist selected conversations as wallet-owned
//! encrypted blobs: a key derived from a wallet signature encrypts the
//! conversation, the resulting envelope is pinned on IPFS, and the content
//! identifier is recorded on chain with a paid transaction. Loading runs the
//! pipeline in reverse.
//!
//! ```text
//! save:  conversation → encrypt → envelope → pin → record CID
//! load:  list CIDs → fetch each → decode → decrypt → sorted memories
//! ```
//!
//! The wallet, AI backend, chain node, and IPFS node are external; storage
//! and ledger are reached through the [`storage::StorageClient`] and
//! [`ledger::LedgerClient`] traits, each with a real HTTP/RPC backend and an
//! in-memory mock.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod ledger;
pub mod memory;
pub mod session;
pub mod storage;
pub mod types;

pub use codec::CodecError;
pub use config::{LedgerConfig, StorageConfig};
pub use crypto::{derive_key, signing_message, CryptoError, MemoryKey};
pub use envelope::{EncryptedEnvelope, ENVELOPE_VERSION};
pub use ledger::{EvmLedger, LedgerClient, LedgerError, MockLedger, RecordReceipt};
pub use memory::{MemoryError, MemoryVault};
pub use session::KeyCache;
pub use storage::{MockStorage, PinataClient, StorageClient, StorageError};
pub use types::{Conversation, LoadedMemories, Memory, Message, Role, SaveOutcome};
