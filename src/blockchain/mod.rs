//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! ClientConfig (endpoint, chain id, private keys)
//!     → wallet.rs (key loading, address derivation, signing)
//!     → client.rs (LedgerClient trait, RPC implementation with timeouts)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - At most one in-flight submission per account

pub mod client;
pub mod contracts;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{LedgerClient, RpcLedgerClient};
pub use transaction::{AccountLocks, SubmissionError, TxIntent, TxOutcome, TxStage, TxSubmitter};
pub use types::{ChainId, LedgerError, LedgerReceipt, LedgerResult};
pub use wallet::{load_account, load_accounts, Account};
