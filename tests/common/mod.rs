//! Shared test doubles for integration tests.

#![allow(dead_code)]

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use election_client::blockchain::contracts::{ElectionBundle, RawCandidate, RawElectionData};
use election_client::blockchain::{ChainId, LedgerClient, LedgerError, LedgerReceipt, LedgerResult};
use election_client::ClientConfig;

// Anvil's first two accounts; publicly known, never use for real funds.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const SECOND_PRIVATE_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const CHAIN_ID: u64 = 31337;
pub const GAS_PRICE: u128 = 2_000_000_000;
pub const GAS_LIMIT: u64 = 150_000;

pub fn manager() -> Address {
    Address::repeat_byte(0x4d)
}

pub fn aggregator() -> Address {
    Address::repeat_byte(0xa6)
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        chain_id: CHAIN_ID,
        manager_address: manager(),
        aggregator_address: aggregator(),
        ..ClientConfig::default()
    }
}

/// What `wait_for_receipt` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptMode {
    Success,
    Revert,
    Timeout,
}

/// In-memory ledger with call counters.
///
/// Nonces advance only when a broadcast with the expected nonce is accepted,
/// like a node's pending pool; a reused nonce is rejected.
pub struct FakeLedger {
    calls: Mutex<HashMap<&'static str, usize>>,
    nonces: Mutex<HashMap<Address, u64>>,
    sent: Mutex<Vec<TxEnvelope>>,
    elections: Mutex<Vec<ElectionBundle>>,
    election_data: Mutex<HashMap<Address, RawElectionData>>,
    balances: Mutex<HashMap<Address, U256>>,
    receipt_mode: Mutex<ReceiptMode>,
    fail_nonce: AtomicBool,
    fail_send: AtomicBool,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            nonces: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            elections: Mutex::new(Vec::new()),
            election_data: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            receipt_mode: Mutex::new(ReceiptMode::Success),
            fail_nonce: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
        }
    }

    pub fn add_election(&self, address: Address, data: RawElectionData) {
        self.elections.lock().unwrap().push(ElectionBundle {
            electionAddress: address,
            name: data.name.clone(),
        });
        self.election_data.lock().unwrap().insert(address, data);
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.balances.lock().unwrap().insert(address, balance);
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.nonces.lock().unwrap().insert(address, nonce);
    }

    pub fn set_receipt_mode(&self, mode: ReceiptMode) {
        *self.receipt_mode.lock().unwrap() = mode;
    }

    pub fn fail_nonce_fetch(&self, fail: bool) {
        self.fail_nonce.store(fail, Ordering::SeqCst);
    }

    pub fn fail_broadcast(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Every accepted transaction, in broadcast order.
    pub fn sent(&self) -> Vec<TxEnvelope> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_nonces(&self) -> Vec<u64> {
        self.sent().iter().map(|tx| tx.nonce()).collect()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn chain_id(&self) -> LedgerResult<ChainId> {
        self.record("chain_id");
        Ok(ChainId(CHAIN_ID))
    }

    async fn get_elections_bundled_with_names(
        &self,
        aggregator: Address,
        manager: Address,
    ) -> LedgerResult<Vec<ElectionBundle>> {
        self.record("get_elections_bundled_with_names");
        assert_eq!(aggregator, crate::common::aggregator());
        assert_eq!(manager, crate::common::manager());
        Ok(self.elections.lock().unwrap().clone())
    }

    async fn get_election_data(
        &self,
        aggregator: Address,
        election: Address,
    ) -> LedgerResult<RawElectionData> {
        self.record("get_election_data");
        assert_eq!(aggregator, crate::common::aggregator());
        self.election_data
            .lock()
            .unwrap()
            .get(&election)
            .cloned()
            .ok_or_else(|| LedgerError::Transport(format!("execution reverted: unknown election {election}")))
    }

    async fn get_balance(&self, address: Address) -> LedgerResult<U256> {
        self.record("get_balance");
        Ok(self.balances.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn get_transaction_count(&self, address: Address) -> LedgerResult<u64> {
        self.record("get_transaction_count");
        tokio::task::yield_now().await;
        if self.fail_nonce.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("connection refused".to_string()));
        }
        Ok(self.nonces.lock().unwrap().get(&address).copied().unwrap_or(0))
    }

    async fn get_gas_price(&self) -> LedgerResult<u128> {
        self.record("get_gas_price");
        Ok(GAS_PRICE)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> LedgerResult<u64> {
        self.record("estimate_gas");
        assert!(request.nonce.is_some(), "estimate must see a populated request");
        Ok(GAS_LIMIT)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> LedgerResult<TxHash> {
        self.record("send_raw_transaction");
        tokio::task::yield_now().await;
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(LedgerError::Transport("connection reset by peer".to_string()));
        }

        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| LedgerError::Transport(format!("invalid transaction: {e}")))?;
        let sender = envelope
            .recover_signer()
            .map_err(|e| LedgerError::Transport(format!("invalid signature: {e}")))?;

        let mut nonces = self.nonces.lock().unwrap();
        let expected = nonces.get(&sender).copied().unwrap_or(0);
        if envelope.nonce() != expected {
            return Err(LedgerError::Transport(format!(
                "nonce too low: expected {expected}, got {}",
                envelope.nonce()
            )));
        }
        nonces.insert(sender, expected + 1);
        drop(nonces);

        let tx_hash = *envelope.tx_hash();
        self.sent.lock().unwrap().push(envelope);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> LedgerResult<LedgerReceipt> {
        self.record("wait_for_receipt");
        tokio::task::yield_now().await;
        let block_number = Some(self.sent.lock().unwrap().len() as u64);
        match *self.receipt_mode.lock().unwrap() {
            ReceiptMode::Success => Ok(LedgerReceipt {
                tx_hash,
                block_number,
                gas_used: 21_000,
                success: true,
            }),
            ReceiptMode::Revert => Ok(LedgerReceipt {
                tx_hash,
                block_number,
                gas_used: 30_000,
                success: false,
            }),
            ReceiptMode::Timeout => Err(LedgerError::ReceiptTimeout {
                tx_hash,
                waited_secs: 120,
            }),
        }
    }
}

pub fn raw_candidate(votes: u64, name: &str, byte: u8) -> RawCandidate {
    RawCandidate {
        votes: U256::from(votes),
        name: name.to_string(),
        candidateAddress: Address::repeat_byte(byte),
    }
}

pub fn raw_election(name: &str, voters: Vec<Address>, candidates: Vec<RawCandidate>) -> RawElectionData {
    RawElectionData {
        name: name.to_string(),
        voters,
        candidates,
        owner: Address::repeat_byte(0xee),
        candidateFee: U256::from(50_000_000_000_000_000u64),
        endTime: U256::from(1_700_003_600u64),
        startTime: U256::from(1_700_000_000u64),
        closed: false,
    }
}

/// Recorder keeping the name and labels of every counter registration.
#[derive(Default)]
pub struct CounterCapture {
    counters: Mutex<Vec<Key>>,
}

impl CounterCapture {
    /// Labels of each registration of counter `name`, in order.
    pub fn labels(&self, name: &str) -> Vec<Vec<(String, String)>> {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.name() == name)
            .map(|key| {
                key.labels()
                    .map(|label| (label.key().to_string(), label.value().to_string()))
                    .collect()
            })
            .collect()
    }
}

impl Recorder for CounterCapture {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
        self.counters.lock().unwrap().push(key.clone());
        Counter::noop()
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
