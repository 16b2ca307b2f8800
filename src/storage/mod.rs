//! Storage Collaborator
//!
//! Pin/fetch of encrypted envelopes by content identifier. The real backend
//! talks to a Pinata-style pinning API; the mock backend keeps everything in
//! memory with error injection and call counting for tests.
//!
//! Content is addressed, immutable once pinned, and referenced forever by
//! the CID the pin call returns.

pub mod mock;
pub mod pinata;

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::EncryptedEnvelope;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Network failure, timeout, or non-2xx response from the service
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The content identifier is unknown to the service
    #[error("not found: {0}")]
    NotFound(String),

    /// The identifier does not look like a CID at all
    #[error("invalid CID: {0}")]
    InvalidCid(String),

    /// Response body could not be serialized or parsed
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Pin/fetch interface to the external pinning service
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Pin an envelope, returning its content identifier
    ///
    /// Fails with `Unavailable` on any non-2xx response; the returned CID is
    /// never empty.
    async fn pin(&self, envelope: &EncryptedEnvelope) -> Result<String, StorageError>;

    /// Fetch a pinned envelope by content identifier
    ///
    /// Fails with `NotFound` if the identifier is unknown, `Unavailable`
    /// otherwise.
    async fn fetch(&self, cid: &str) -> Result<EncryptedEnvelope, StorageError>;
}

pub use mock::MockStorage;
pub use pinata::PinataClient;
