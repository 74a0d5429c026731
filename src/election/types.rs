//! Election domain types and errors.

use alloy::primitives::{Address, U256};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::blockchain::{LedgerError, SubmissionError};

/// A candidate as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub address: Address,
    pub name: String,
    pub votes: u64,
}

/// A candidate with its computed leaderboard position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Dense rank starting at 1; tied candidates share a rank.
    pub rank: u32,
}

/// Handle to one election deployed by the manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElectionRef {
    pub address: Address,
    pub name: String,
}

impl fmt::Display for ElectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Election data after boundary validation, candidates still in ledger order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionRecord {
    pub name: String,
    pub voters: Vec<Address>,
    pub candidates: Vec<Candidate>,
    pub owner: Address,
    pub candidate_fee: U256,
    pub end_time: u64,
    pub start_time: u64,
    pub closed: bool,
}

/// Ranked view of one election.
///
/// `candidates` is sorted by votes, highest first; equal votes keep ledger
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionResult {
    pub name: String,
    pub owner: Address,
    pub candidate_fee_wei: U256,
    pub start_time: u64,
    pub end_time: u64,
    pub closed: bool,
    pub voter_addresses: BTreeSet<Address>,
    pub candidates: Vec<RankedCandidate>,
    pub candidate_addresses: BTreeSet<Address>,
}

impl ElectionResult {
    /// Every candidate sharing rank 1. Empty when there are no candidates.
    pub fn winners(&self) -> impl Iterator<Item = &RankedCandidate> {
        self.candidates.iter().take_while(|c| c.rank == 1)
    }

    pub fn candidate(&self, address: Address) -> Option<&RankedCandidate> {
        self.candidates
            .iter()
            .find(|c| c.candidate.address == address)
    }

    pub fn is_candidate(&self, address: Address) -> bool {
        self.candidate_addresses.contains(&address)
    }

    pub fn has_voted(&self, address: Address) -> bool {
        self.voter_addresses.contains(&address)
    }

    pub fn total_votes(&self) -> u128 {
        self.candidates
            .iter()
            .map(|c| u128::from(c.candidate.votes))
            .sum()
    }
}

/// Errors surfaced by the election client.
#[derive(Debug, Error)]
pub enum ElectionError {
    /// Caller input violates a precondition; nothing was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A read or query against the ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A state-changing submission ended before confirmation.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result type for election client operations.
pub type ClientResult<T> = Result<T, ElectionError>;
