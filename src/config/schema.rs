//! Configuration schema definitions.
//!
//! All fields have defaults so a config file only needs the values that
//! differ. Private keys are accepted on input but never serialized.

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Manager contract of the public deployment.
pub const DEFAULT_MANAGER_ADDRESS: Address = address!("0xC690ce62e557B7e7687DFb58945D49022851621A");

/// Aggregator contract of the public deployment.
pub const DEFAULT_AGGREGATOR_ADDRESS: Address = address!("0x2A0B10368e69E35a330Fac7DeFcC9dC879e8B021");

/// Root configuration for the election client.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint (http or https).
    pub rpc_url: String,

    /// Chain ID used for EIP-155 signing.
    pub chain_id: u64,

    /// Hex-encoded private keys, one account each.
    #[serde(skip_serializing)]
    pub private_keys: Vec<String>,

    /// Election manager contract.
    pub manager_address: Address,

    /// Election data aggregator contract.
    pub aggregator_address: Address,

    /// Timeout for a single RPC request.
    pub rpc_timeout_secs: u64,

    /// How long to wait for a transaction receipt.
    pub receipt_timeout_secs: u64,

    /// Receipt polling interval.
    pub receipt_poll_interval_ms: u64,

    /// Blocks required on top of the receipt's block (0 = receipt is enough).
    pub confirmation_blocks: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 1,
            private_keys: Vec::new(),
            manager_address: DEFAULT_MANAGER_ADDRESS,
            aggregator_address: DEFAULT_AGGREGATOR_ADDRESS,
            rpc_timeout_secs: 10,
            receipt_timeout_secs: 120,
            receipt_poll_interval_ms: 1_000,
            confirmation_blocks: 0,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("private_keys", &format_args!("[{} redacted]", self.private_keys.len()))
            .field("manager_address", &self.manager_address)
            .field("aggregator_address", &self.aggregator_address)
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .field("receipt_timeout_secs", &self.receipt_timeout_secs)
            .field("receipt_poll_interval_ms", &self.receipt_poll_interval_ms)
            .field("confirmation_blocks", &self.confirmation_blocks)
            .finish()
    }
}
