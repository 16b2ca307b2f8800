//! Memory Orchestrator
//!
//! The save/load protocol over the storage and ledger collaborators.
//!
//! **Save** is strictly sequential with no retries: encrypt, seal the
//! envelope, pin, then record the CID on chain. Any failure short-circuits,
//! so a ledger entry can never exist without pinned content behind it. A
//! ledger failure after a successful pin leaves the content pinned; the
//! caller may retry just the record step.
//!
//! **Load** is best-effort per item: the initial listing must succeed, but
//! each CID is fetched, decoded, and decrypted independently (and
//! concurrently), and one unreadable memory never hides the rest.

use futures::future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::crypto::{self, CryptoError, MemoryKey};
use crate::codec::CodecError;
use crate::envelope::EncryptedEnvelope;
use crate::ledger::{LedgerClient, LedgerError};
use crate::storage::{StorageClient, StorageError};
use crate::types::{Conversation, LoadedMemories, Memory, SaveOutcome};

/// Failure taxonomy for the memory protocol
///
/// Every variant is recoverable from the caller's perspective: retry the
/// save, prompt for re-authentication, or accept the partial load result.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Save/load orchestration over the external collaborators
///
/// Holds no keys and no per-call state; every operation works purely on its
/// arguments, so concurrent calls never interfere.
#[derive(Clone)]
pub struct MemoryVault {
    storage: Arc<dyn StorageClient>,
    ledger: Arc<dyn LedgerClient>,
}

impl MemoryVault {
    pub fn new(storage: Arc<dyn StorageClient>, ledger: Arc<dyn LedgerClient>) -> Self {
        Self { storage, ledger }
    }

    /// Save a conversation as an encrypted memory
    ///
    /// Encrypt, pin, record, in that order. Pin failure aborts before any
    /// ledger write. A user rejecting the record transaction yields
    /// `Ok(SaveOutcome::Cancelled)`, not an error.
    pub async fn save_memory(
        &self,
        conversation: &Conversation,
        key: &MemoryKey,
        wallet_address: &str,
    ) -> Result<SaveOutcome, MemoryError> {
        info!("Encrypting conversation {}", conversation.id);
        let (ciphertext, iv) = crypto::encrypt_conversation(conversation, key)?;
        let envelope = EncryptedEnvelope::seal(&ciphertext, &iv, wallet_address);

        let cid = self.storage.pin(&envelope).await?;
        if cid.is_empty() {
            return Err(StorageError::Serialization(
                "storage returned an empty CID".to_string(),
            )
            .into());
        }
        info!("Pinned envelope at {}", cid);

        let receipt = match self.ledger.record(&cid).await {
            Ok(receipt) => receipt,
            Err(LedgerError::UserRejected) => {
                info!("Record transaction rejected by user, save cancelled");
                return Ok(SaveOutcome::Cancelled);
            }
            // Content stays pinned at `cid`; only the record step needs a retry
            Err(e) => return Err(e.into()),
        };
        info!("Memory recorded on chain: {}", receipt.tx_hash);

        Ok(SaveOutcome::Saved {
            cid,
            tx_hash: receipt.tx_hash,
        })
    }

    /// Load every readable memory for a wallet, most recent first
    ///
    /// Only a failure of the initial ledger listing fails the call. Empty
    /// (tombstoned) CIDs are skipped silently; per-CID fetch/decode/decrypt
    /// failures are logged, counted in `skipped`, and excluded from the
    /// result.
    pub async fn load_memories(
        &self,
        wallet_address: &str,
        key: &MemoryKey,
    ) -> Result<LoadedMemories, MemoryError> {
        let cids = self.ledger.list_cids(wallet_address).await?;
        if cids.is_empty() {
            return Ok(LoadedMemories::default());
        }
        info!("Found {} ledger entries for {}", cids.len(), wallet_address);

        let live: Vec<String> = cids.into_iter().filter(|cid| !cid.is_empty()).collect();

        let recoveries = live.iter().map(|cid| self.recover_one(cid, key));
        let results = future::join_all(recoveries).await;

        let mut memories = Vec::new();
        let mut skipped = 0;
        for (cid, result) in live.iter().zip(results) {
            match result {
                Ok(memory) => memories.push(memory),
                Err(e) => {
                    warn!("Skipping memory {}: {}", cid, e);
                    skipped += 1;
                }
            }
        }

        memories.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        info!(
            "Loaded {} memories ({} skipped) for {}",
            memories.len(),
            skipped,
            wallet_address
        );

        Ok(LoadedMemories { memories, skipped })
    }

    /// Number of ledger entries for a wallet; 0 on query failure
    pub async fn memory_count(&self, wallet_address: &str) -> u64 {
        self.ledger.count(wallet_address).await
    }

    async fn recover_one(&self, cid: &str, key: &MemoryKey) -> Result<Memory, MemoryError> {
        let envelope = self.storage.fetch(cid).await?;
        let (ciphertext, iv) = envelope.open()?;
        let conversation = crypto::decrypt_conversation(&ciphertext, &iv, key)?;

        Ok(Memory {
            cid: cid.to_string(),
            conversation,
            timestamp: envelope.timestamp,
            tx_hash: None,
            block_number: None,
        })
    }
}
