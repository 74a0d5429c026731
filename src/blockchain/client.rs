//! Ledger client boundary and its JSON-RPC implementation.
//!
//! # Responsibilities
//! - Define the `LedgerClient` operations the rest of the crate consumes
//! - Connect to one JSON-RPC endpoint
//! - Query chain state (chain id, balances, nonces, gas price, receipts)
//! - Issue read-only contract calls to the aggregator
//! - Bound every RPC call with a timeout and map faults to `LedgerError`

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::fmt::Display;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::contracts::{ElectionBundle, IElectionAggregator, RawElectionData};
use crate::blockchain::types::{ChainId, LedgerError, LedgerReceipt, LedgerResult};
use crate::config::ClientConfig;
use crate::observability::metrics;

/// Operations the election client needs from the ledger.
///
/// Implementations own their transport, timeout and polling policy. Callers
/// receive every fault as a `LedgerError`; nothing is replaced by a default.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> LedgerResult<ChainId>;

    /// `(electionAddress, name)` pairs for every election of `manager`.
    async fn get_elections_bundled_with_names(
        &self,
        aggregator: Address,
        manager: Address,
    ) -> LedgerResult<Vec<ElectionBundle>>;

    /// Undecoded election data as returned by the aggregator.
    async fn get_election_data(
        &self,
        aggregator: Address,
        election: Address,
    ) -> LedgerResult<RawElectionData>;

    /// Balance in wei.
    async fn get_balance(&self, address: Address) -> LedgerResult<U256>;

    /// Number of transactions sent from `address`, i.e. its next nonce.
    async fn get_transaction_count(&self, address: Address) -> LedgerResult<u64>;

    /// Current gas price in wei.
    async fn get_gas_price(&self) -> LedgerResult<u128>;

    /// Gas limit estimate for a fully populated request.
    async fn estimate_gas(&self, request: &TransactionRequest) -> LedgerResult<u64>;

    /// Broadcast signed, EIP-2718 encoded transaction bytes.
    ///
    /// Returning a hash only means the node accepted the bytes.
    async fn send_raw_transaction(&self, raw: &[u8]) -> LedgerResult<TxHash>;

    /// Block until the transaction has a receipt.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> LedgerResult<LedgerReceipt>;
}

/// JSON-RPC backed ledger client.
#[derive(Clone)]
pub struct RpcLedgerClient {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
    /// Per-call timeout.
    timeout_duration: Duration,
    receipt_timeout: Duration,
    poll_interval: Duration,
    confirmation_blocks: u64,
}

impl RpcLedgerClient {
    /// Create a client for the configured endpoint.
    ///
    /// No request is sent; an unreachable node surfaces on first use.
    pub fn new(config: &ClientConfig) -> LedgerResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Transport(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider = Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            "Ledger client initialized"
        );

        Ok(Self {
            provider,
            rpc_url: config.rpc_url.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
            poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            confirmation_blocks: config.confirmation_blocks,
        })
    }

    /// Verify the node serves the chain we sign for.
    pub async fn verify_chain_id(&self, expected: ChainId) -> LedgerResult<()> {
        let actual = self.chain_id().await?;
        if actual != expected {
            return Err(LedgerError::ChainMismatch {
                expected: expected.0,
                actual: actual.0,
            });
        }
        Ok(())
    }

    /// Latest block number.
    pub async fn get_block_number(&self) -> LedgerResult<u64> {
        self.rpc("eth_blockNumber", self.provider.get_block_number()).await
    }

    async fn rpc<F, T, E>(&self, method: &'static str, call: F) -> LedgerResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, call).await {
            Ok(Ok(value)) => {
                metrics::record_rpc_call(method, "ok");
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::warn!(method, error = %e, "RPC error");
                metrics::record_rpc_call(method, "error");
                Err(LedgerError::Transport(format!("{method}: {e}")))
            }
            Err(_) => {
                tracing::warn!(method, timeout_secs = self.timeout_duration.as_secs(), "RPC timeout");
                metrics::record_rpc_call(method, "timeout");
                Err(LedgerError::Transport(format!(
                    "{method} timed out after {} seconds",
                    self.timeout_duration.as_secs()
                )))
            }
        }
    }

    async fn view<C: SolCall>(&self, to: Address, call: C) -> LedgerResult<C::Return> {
        let request = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let output = self.rpc(C::SIGNATURE, self.provider.call(request)).await?;
        C::abi_decode_returns(&output)
            .map_err(|e| LedgerError::Decode(format!("{} returned malformed data: {}", C::SIGNATURE, e)))
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn chain_id(&self) -> LedgerResult<ChainId> {
        self.rpc("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    async fn get_elections_bundled_with_names(
        &self,
        aggregator: Address,
        manager: Address,
    ) -> LedgerResult<Vec<ElectionBundle>> {
        self.view(
            aggregator,
            IElectionAggregator::getElectionsBundledWithNamesCall { manager },
        )
        .await
    }

    async fn get_election_data(
        &self,
        aggregator: Address,
        election: Address,
    ) -> LedgerResult<RawElectionData> {
        self.view(aggregator, IElectionAggregator::getElectionDataCall { election })
            .await
    }

    async fn get_balance(&self, address: Address) -> LedgerResult<U256> {
        self.rpc("eth_getBalance", self.provider.get_balance(address)).await
    }

    async fn get_transaction_count(&self, address: Address) -> LedgerResult<u64> {
        self.rpc(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    async fn get_gas_price(&self) -> LedgerResult<u128> {
        self.rpc("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> LedgerResult<u64> {
        self.rpc("eth_estimateGas", self.provider.estimate_gas(request.clone()))
            .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> LedgerResult<TxHash> {
        let pending = self
            .rpc("eth_sendRawTransaction", self.provider.send_raw_transaction(raw))
            .await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> LedgerResult<LedgerReceipt> {
        let required = self.confirmation_blocks;

        let result = timeout(self.receipt_timeout, async {
            let mut ticker = interval(self.poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self
                    .rpc(
                        "eth_getTransactionReceipt",
                        self.provider.get_transaction_receipt(tx_hash),
                    )
                    .await?
                {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if required > 0 {
                    let current_block = self.get_block_number().await?;
                    let tx_block = receipt.block_number.unwrap_or(current_block);
                    let confirmations = current_block.saturating_sub(tx_block);
                    if confirmations < required {
                        tracing::debug!(
                            tx_hash = %tx_hash,
                            confirmations,
                            required,
                            "Waiting for confirmations"
                        );
                        continue;
                    }
                }

                return Ok(LedgerReceipt {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                    success: receipt.status(),
                });
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(LedgerError::ReceiptTimeout {
                tx_hash,
                waited_secs: self.receipt_timeout.as_secs(),
            }),
        }
    }
}

impl std::fmt::Debug for RpcLedgerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedgerClient")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .field("receipt_timeout_secs", &self.receipt_timeout.as_secs())
            .finish()
    }
}
