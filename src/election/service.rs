//! Election client: read path and write path over one injected ledger client.
//!
//! Reads go aggregator → decode → rank. Writes build a `TxIntent` and hand
//! it to the submission pipeline. The two paths share no mutable state.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::blockchain::contracts::{IElection, IElectionManager};
use crate::blockchain::{
    Account, AccountLocks, ChainId, LedgerClient, TxIntent, TxOutcome, TxSubmitter,
};
use crate::config::ClientConfig;
use crate::election::decode::decode_bundle;
use crate::election::ranking::aggregate_raw;
use crate::election::types::{ClientResult, ElectionError, ElectionRef, ElectionResult};
use crate::observability::metrics;

/// Exact stake `runForElection` must carry: 0.05 ether.
pub const CANDIDATE_STAKE_WEI: U256 = U256::from_limbs([50_000_000_000_000_000, 0, 0, 0]);

/// `createElection(name, endTime)` on the manager.
///
/// Fails with `ElectionError::Validation` on an empty name.
pub fn create_election_intent<'a>(
    from: &'a Account,
    manager: Address,
    name: &str,
    end_time: u64,
) -> ClientResult<TxIntent<'a>> {
    if name.is_empty() {
        return Err(ElectionError::Validation("Election name cannot be empty".to_string()));
    }
    let call = IElectionManager::createElectionCall {
        name: name.to_string(),
        endTime: U256::from(end_time),
    };
    Ok(TxIntent::call(from, manager, &call))
}

/// `runForElection(candidateName)` carrying `CANDIDATE_STAKE_WEI`.
pub fn run_for_election_intent<'a>(
    from: &'a Account,
    election: Address,
    candidate_name: &str,
) -> TxIntent<'a> {
    let call = IElection::runForElectionCall {
        candidateName: candidate_name.to_string(),
    };
    TxIntent::call(from, election, &call).with_value(CANDIDATE_STAKE_WEI)
}

/// `withdrawRevenue()` without value.
pub fn withdraw_revenue_intent(from: &Account, election: Address) -> TxIntent<'_> {
    TxIntent::call(from, election, &IElection::withdrawRevenueCall {})
}

/// Entry point for election queries and mutations.
pub struct ElectionClient<C: LedgerClient + ?Sized> {
    ledger: Arc<C>,
    manager: Address,
    aggregator: Address,
    submitter: TxSubmitter<C>,
}

impl<C: LedgerClient + ?Sized> ElectionClient<C> {
    pub fn new(ledger: Arc<C>, config: &ClientConfig) -> Self {
        Self::with_locks(ledger, config, AccountLocks::new())
    }

    /// Create a client whose submissions share `locks` with other clients.
    ///
    /// Clients in one process that sign with the same account must share
    /// one lock map, or their nonces collide.
    pub fn with_locks(ledger: Arc<C>, config: &ClientConfig, locks: AccountLocks) -> Self {
        Self {
            submitter: TxSubmitter::with_locks(ledger.clone(), ChainId(config.chain_id), locks),
            ledger,
            manager: config.manager_address,
            aggregator: config.aggregator_address,
        }
    }

    pub fn ledger(&self) -> &C {
        &self.ledger
    }

    pub fn submitter(&self) -> &TxSubmitter<C> {
        &self.submitter
    }

    pub fn manager_address(&self) -> Address {
        self.manager
    }

    /// All elections created through the manager.
    pub async fn list_elections(&self) -> ClientResult<Vec<ElectionRef>> {
        let bundles = self
            .ledger
            .get_elections_bundled_with_names(self.aggregator, self.manager)
            .await?;
        let elections = bundles
            .into_iter()
            .map(decode_bundle)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = elections.len(), manager = %self.manager, "Elections listed");
        Ok(elections)
    }

    /// Ranked result of one election.
    pub async fn election_result(&self, election: &ElectionRef) -> ClientResult<ElectionResult> {
        self.election_result_at(election.address).await
    }

    /// Ranked result of the election deployed at `address`.
    pub async fn election_result_at(&self, address: Address) -> ClientResult<ElectionResult> {
        let raw = self
            .ledger
            .get_election_data(self.aggregator, address)
            .await?;
        let result = aggregate_raw(raw)?;
        metrics::record_aggregation(result.candidates.len());

        tracing::debug!(
            election = %address,
            candidates = result.candidates.len(),
            voters = result.voter_addresses.len(),
            "Election result aggregated"
        );
        Ok(result)
    }

    /// Balance in wei.
    pub async fn balance(&self, address: Address) -> ClientResult<U256> {
        Ok(self.ledger.get_balance(address).await?)
    }

    /// Create a new election ending at `end_time` (unix seconds).
    pub async fn create_election(
        &self,
        from: &Account,
        name: &str,
        end_time: u64,
    ) -> ClientResult<TxOutcome> {
        let intent = create_election_intent(from, self.manager, name, end_time)?;
        Ok(self.submitter.submit(intent).await?)
    }

    /// Register `from` as a candidate in `election`, paying the stake.
    pub async fn run_for_election(
        &self,
        from: &Account,
        election: &ElectionRef,
        candidate_name: &str,
    ) -> ClientResult<TxOutcome> {
        let intent = run_for_election_intent(from, election.address, candidate_name);
        Ok(self.submitter.submit(intent).await?)
    }

    /// Withdraw revenue accrued by `election` to `from`.
    pub async fn withdraw_revenue(
        &self,
        from: &Account,
        election: &ElectionRef,
    ) -> ClientResult<TxOutcome> {
        let intent = withdraw_revenue_intent(from, election.address);
        Ok(self.submitter.submit(intent).await?)
    }
}
