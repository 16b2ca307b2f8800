//! Ledger Collaborator
//!
//! Append-only, per-address record keeping on chain. Recording a CID is a
//! paid, state-changing transaction; listing and counting are free reads.
//! The real backend talks to the MemoryStorage contract through ethers; the
//! mock keeps per-address lists in memory.

pub mod evm;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller cannot cover the record fee
    #[error("insufficient funds for the memory fee")]
    InsufficientFunds,

    /// The user declined to sign the transaction
    #[error("transaction rejected by user")]
    UserRejected,

    /// RPC transport failure
    #[error("ledger network error: {0}")]
    Network(String),

    /// Contract revert or malformed call
    #[error("ledger contract error: {0}")]
    Contract(String),
}

/// Confirmation of a record transaction
#[derive(Debug, Clone, PartialEq)]
pub struct RecordReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Record/list interface to the external ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Record a CID against the signer's address and wait for confirmation
    ///
    /// Paid and state-changing. Fails with the typed sub-cases above; the
    /// orchestrator treats `UserRejected` as cancellation, not failure.
    async fn record(&self, cid: &str) -> Result<RecordReceipt, LedgerError>;

    /// List all CIDs recorded for an address, oldest first
    ///
    /// An address with no entries yields an empty list, not an error.
    async fn list_cids(&self, address: &str) -> Result<Vec<String>, LedgerError>;

    /// Number of entries for an address
    ///
    /// Informational read: any query failure is reported as 0.
    async fn count(&self, address: &str) -> u64;
}

pub use evm::EvmLedger;
pub use mock::MockLedger;
