//! Client for on-chain elections.
//!
//! Reads ranked election results through an aggregator contract and submits
//! election mutations (create, run for office, withdraw revenue) as signed,
//! nonce-sequenced transactions.

pub mod blockchain;
pub mod config;
pub mod election;
pub mod observability;

pub use blockchain::{Account, LedgerClient, RpcLedgerClient};
pub use config::ClientConfig;
pub use election::{ElectionClient, ElectionError, ElectionResult};
