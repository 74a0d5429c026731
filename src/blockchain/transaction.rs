//! Transaction building, signing, submission and confirmation.
//!
//! # State machine
//! ```text
//! Built → Signed → Submitted → Pending → Confirmed
//!                                      ↘ Failed
//! ```
//! Every stage runs strictly after the previous one. Nonce and gas price are
//! fetched fresh for each attempt. There is no retry loop: the first error
//! ends the attempt and is reported together with the last stage reached.
//!
//! # Concurrency
//! Nonces are read from the ledger and used without reservation, so two
//! in-flight submissions from one account would race for the same nonce.
//! `AccountLocks` serializes submissions per sender address for everything
//! going through one `TxSubmitter`. Submitters that share an account must
//! share the lock map (`TxSubmitter::with_locks`, `ElectionClient::with_locks`).

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::blockchain::client::LedgerClient;
use crate::blockchain::types::{ChainId, LedgerError, LedgerReceipt, LedgerResult};
use crate::blockchain::wallet::Account;
use crate::observability::metrics;

/// Stages of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TxStage {
    /// Chain-native request populated with nonce, gas price and gas limit.
    Built,
    /// Signed locally; nothing has left the process yet.
    Signed,
    /// Node accepted the raw bytes and returned a hash.
    Submitted,
    /// Waiting for a receipt.
    Pending,
    /// Included with a successful receipt.
    Confirmed,
    /// Terminal failure.
    Failed,
}

impl TxStage {
    pub fn as_str(self) -> &'static str {
        match self {
            TxStage::Built => "built",
            TxStage::Signed => "signed",
            TxStage::Submitted => "submitted",
            TxStage::Pending => "pending",
            TxStage::Confirmed => "confirmed",
            TxStage::Failed => "failed",
        }
    }
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One desired state mutation.
#[derive(Debug, Clone)]
pub struct TxIntent<'a> {
    /// Contract function name, used for logs and metrics.
    pub function: &'static str,
    /// Target contract.
    pub to: Address,
    /// ABI encoded selector and arguments.
    pub input: Bytes,
    /// Native currency transferred with the call.
    pub value: Option<U256>,
    /// Originating account; its key signs the transaction.
    pub from: &'a Account,
}

impl<'a> TxIntent<'a> {
    /// Intent calling `call` on the contract at `to`.
    pub fn call<C: SolCall>(from: &'a Account, to: Address, call: &C) -> Self {
        Self {
            function: C::SIGNATURE
                .split_once('(')
                .map_or(C::SIGNATURE, |(name, _)| name),
            to,
            input: call.abi_encode().into(),
            value: None,
            from,
        }
    }

    /// Attach a transferred amount.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }
}

/// Terminal result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub confirmed: bool,
    pub receipt: LedgerReceipt,
}

/// A submission attempt that ended before confirmation.
#[derive(Debug, Error)]
#[error(
    "{function} aborted after stage {}: {source}",
    .last_reached.map_or("none", TxStage::as_str)
)]
pub struct SubmissionError {
    pub function: &'static str,
    /// Last stage completed; `None` if the request could not even be built.
    pub last_reached: Option<TxStage>,
    /// Known once the node accepted the transaction.
    pub tx_hash: Option<TxHash>,
    pub source: LedgerError,
}

impl SubmissionError {
    /// Whether the transaction may have reached the network.
    ///
    /// When true, a resubmission must fetch a fresh nonce and will fail if
    /// the first attempt was eventually included.
    pub fn was_broadcast(&self) -> bool {
        self.tx_hash.is_some()
    }
}

/// Per-account submission locks keyed by sender address.
#[derive(Debug, Default, Clone)]
pub struct AccountLocks {
    locks: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other submission from `address` is in flight.
    pub async fn acquire(&self, address: Address) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(address).or_default().clone();
        lock.lock_owned().await
    }
}

/// Runs intents through build, sign, submit and confirm.
pub struct TxSubmitter<C: LedgerClient + ?Sized> {
    client: Arc<C>,
    chain_id: ChainId,
    locks: AccountLocks,
}

impl<C: LedgerClient + ?Sized> TxSubmitter<C> {
    pub fn new(client: Arc<C>, chain_id: ChainId) -> Self {
        Self::with_locks(client, chain_id, AccountLocks::new())
    }

    /// Create a submitter sharing `locks` with other submitters.
    pub fn with_locks(client: Arc<C>, chain_id: ChainId, locks: AccountLocks) -> Self {
        Self {
            client,
            chain_id,
            locks,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    /// Submit `intent` and wait for its receipt.
    pub async fn submit(&self, intent: TxIntent<'_>) -> Result<TxOutcome, SubmissionError> {
        let function = intent.function;
        let from = intent.from.address();
        let _guard = self.locks.acquire(from).await;

        let request = self
            .build(&intent)
            .await
            .map_err(|e| Self::abort(function, None, None, e))?;
        tracing::debug!(
            function,
            from = %from,
            to = %intent.to,
            nonce = request.nonce,
            "Transaction built"
        );

        // `build` always yields a complete legacy request, so with a local key
        // this stage fails only on signer faults. The incomplete-request
        // mapping to `LedgerError::Signing` is tested in `wallet`.
        let raw = intent
            .from
            .sign(request)
            .await
            .map_err(|e| Self::abort(function, Some(TxStage::Built), None, e))?;
        tracing::debug!(function, bytes = raw.len(), "Transaction signed");

        let tx_hash = self
            .client
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| Self::abort(function, Some(TxStage::Signed), None, e))?;
        tracing::info!(function, tx_hash = %tx_hash, "Transaction submitted");

        let receipt = self
            .client
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| Self::abort(function, Some(TxStage::Pending), Some(tx_hash), e))?;

        if !receipt.success {
            let reason = match receipt.block_number {
                Some(block) => format!("execution failed in block {block}"),
                None => "execution failed".to_string(),
            };
            return Err(Self::abort(
                function,
                Some(TxStage::Pending),
                Some(tx_hash),
                LedgerError::Reverted { tx_hash, reason },
            ));
        }

        tracing::info!(
            function,
            tx_hash = %tx_hash,
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        metrics::record_submission(function, "confirmed", Some(TxStage::Confirmed));

        Ok(TxOutcome {
            tx_hash,
            confirmed: true,
            receipt,
        })
    }

    async fn build(&self, intent: &TxIntent<'_>) -> LedgerResult<TransactionRequest> {
        let from = intent.from.address();
        let nonce = self.client.get_transaction_count(from).await?;
        let gas_price = self.client.get_gas_price().await?;

        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_to(intent.to)
            .with_input(intent.input.clone())
            .with_nonce(nonce)
            .with_gas_price(gas_price)
            .with_chain_id(self.chain_id.0);
        if let Some(value) = intent.value {
            request = request.with_value(value);
        }

        let gas_limit = self.client.estimate_gas(&request).await?;
        Ok(request.with_gas_limit(gas_limit))
    }

    fn abort(
        function: &'static str,
        last_reached: Option<TxStage>,
        tx_hash: Option<TxHash>,
        source: LedgerError,
    ) -> SubmissionError {
        tracing::warn!(
            function,
            last_reached = last_reached.map_or("none", TxStage::as_str),
            tx_hash = ?tx_hash,
            error = %source,
            "Transaction failed"
        );
        metrics::record_submission(function, "failed", last_reached);
        SubmissionError {
            function,
            last_reached,
            tx_hash,
            source,
        }
    }
}
