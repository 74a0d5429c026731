//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use serde::Serialize;
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The node could not be reached or answered with something unusable.
    #[error("transport error: {0}")]
    Transport(String),

    /// Contract return data did not match the expected layout.
    #[error("decode error: {0}")]
    Decode(String),

    /// The ledger included the transaction but execution reverted.
    #[error("transaction {tx_hash} reverted: {reason}")]
    Reverted { tx_hash: TxHash, reason: String },

    /// No receipt arrived within the configured wait.
    #[error("no receipt for transaction {tx_hash} after {waited_secs} seconds")]
    ReceiptTimeout { tx_hash: TxHash, waited_secs: u64 },

    /// Chain configuration mismatch.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Invalid private key format or derivation error.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Local signing of a built transaction failed.
    #[error("signing error: {0}")]
    Signing(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// The parts of a transaction receipt the client cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Execution status; `false` means the transaction reverted.
    pub success: bool,
}
