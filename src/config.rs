//! Collaborator configuration
//!
//! Explicit config structs for the storage and ledger backends. The core
//! operations never read ambient state; everything arrives through these
//! structs, which can be built by hand or loaded from `DEMEMO_*` environment
//! variables (`.env` files work through dotenv).

use anyhow::{anyhow, Result};
use std::env;

const DEFAULT_PIN_API_URL: &str = "https://api.pinata.cloud/pinning/pinJSONToIPFS";
const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
const DEFAULT_RPC_URL: &str = "https://rpc.testnet.arc.network";
const DEFAULT_CHAIN_ID: u64 = 5042002;
// 0.01 in the chain's 6-decimal native unit
const DEFAULT_RECORD_FEE_UNITS: u64 = 10_000;

/// Pinning service configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub api_url: String,
    pub gateway_url: String,
    pub jwt: String,
}

impl StorageConfig {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_PIN_API_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            jwt: jwt.into(),
        }
    }

    /// Load from environment; `DEMEMO_PINATA_JWT` is required
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let jwt = env::var("DEMEMO_PINATA_JWT")
            .map_err(|_| anyhow!("DEMEMO_PINATA_JWT is not set"))?;

        Ok(Self {
            api_url: env::var("DEMEMO_PIN_API_URL")
                .unwrap_or_else(|_| DEFAULT_PIN_API_URL.to_string()),
            gateway_url: env::var("DEMEMO_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            jwt,
        })
    }
}

/// Ledger chain configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: String,
    /// Fee for one record call, in the chain's smallest native unit
    pub record_fee_units: u64,
}

impl LedgerConfig {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            contract_address: contract_address.into(),
            record_fee_units: DEFAULT_RECORD_FEE_UNITS,
        }
    }

    /// Load from environment; `DEMEMO_MEMORY_CONTRACT_ADDRESS` is required
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let contract_address = env::var("DEMEMO_MEMORY_CONTRACT_ADDRESS")
            .map_err(|_| anyhow!("DEMEMO_MEMORY_CONTRACT_ADDRESS is not set"))?;

        let chain_id = match env::var("DEMEMO_CHAIN_ID") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow!("invalid DEMEMO_CHAIN_ID '{}': {}", raw, e))?,
            Err(_) => DEFAULT_CHAIN_ID,
        };

        let record_fee_units = match env::var("DEMEMO_RECORD_FEE_UNITS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow!("invalid DEMEMO_RECORD_FEE_UNITS '{}': {}", raw, e))?,
            Err(_) => DEFAULT_RECORD_FEE_UNITS,
        };

        Ok(Self {
            rpc_url: env::var("DEMEMO_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            chain_id,
            contract_address,
            record_fee_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::new("jwt-token");
        assert_eq!(config.api_url, DEFAULT_PIN_API_URL);
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.jwt, "jwt-token");
    }

    #[test]
    fn test_ledger_config_defaults() {
        let config = LedgerConfig::new("0x1111111111111111111111111111111111111111");
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.record_fee_units, 10_000);
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
    }
}
