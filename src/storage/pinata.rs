//! Pinata pinning backend
//!
//! Pins envelopes through the `pinJSONToIPFS` endpoint and fetches them back
//! through the public gateway. Authentication is a bearer JWT. Timeouts live
//! in the HTTP client; a timed-out request surfaces as `Unavailable` like
//! any other network failure.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{StorageClient, StorageError};
use crate::config::StorageConfig;
use crate::envelope::EncryptedEnvelope;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct PinataClient {
    client: reqwest::Client,
    api_url: String,
    gateway_url: String,
    jwt: String,
}

impl PinataClient {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Unavailable(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url,
            gateway_url: config.gateway_url,
            jwt: config.jwt,
        })
    }

    fn validate_cid(cid: &str) -> Result<(), StorageError> {
        // v0 CIDs start with Qm, v1 with bafy
        if !cid.starts_with("Qm") && !cid.starts_with("bafy") {
            return Err(StorageError::InvalidCid(cid.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for PinataClient {
    async fn pin(&self, envelope: &EncryptedEnvelope) -> Result<String, StorageError> {
        let body = serde_json::json!({
            "pinataContent": envelope,
            "pinataMetadata": {
                "name": format!("dememo-{}", envelope.timestamp),
                "keyvalues": {
                    "app": "dememo",
                    "version": envelope.version,
                    "timestamp": envelope.timestamp.to_string(),
                }
            }
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.jwt))
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("network error: {}", e)))?;

        if !response.status().is_success() {
            return Err(StorageError::Unavailable(format!(
                "pin failed: {}",
                response.status()
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let cid = result["IpfsHash"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                StorageError::Serialization("pin response missing IpfsHash".to_string())
            })?;

        debug!("Pinned envelope at {}", cid);
        Ok(cid.to_string())
    }

    async fn fetch(&self, cid: &str) -> Result<EncryptedEnvelope, StorageError> {
        Self::validate_cid(cid)?;

        let url = format!("{}/ipfs/{}", self.gateway_url, cid);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("network error: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(cid.to_string()));
        }

        if !response.status().is_success() {
            return Err(StorageError::Unavailable(format!(
                "fetch failed: {}",
                response.status()
            )));
        }

        response
            .json::<EncryptedEnvelope>()
            .await
            .map_err(|e| StorageError::Serialization(format!("malformed envelope: {}", e)))
    }
}
