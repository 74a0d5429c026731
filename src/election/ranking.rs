//! Election results aggregation and ranking.
//!
//! Ranking is dense ("1-1-2"): tied candidates share a rank and the next
//! distinct vote count gets the following integer, whatever the size of the
//! tie group. Votes `[10, 10, 7]` rank as `[1, 1, 2]`, not `[1, 1, 3]`.
//!
//! Everything here is pure: the same record always yields the same result.

use std::collections::BTreeSet;

use crate::blockchain::contracts::RawElectionData;
use crate::blockchain::LedgerResult;
use crate::election::decode::decode_election;
use crate::election::types::{Candidate, ElectionRecord, ElectionResult, RankedCandidate};

/// Decode and rank one aggregator result.
pub fn aggregate_raw(raw: RawElectionData) -> LedgerResult<ElectionResult> {
    decode_election(raw).map(aggregate)
}

/// Turn a decoded record into a ranked result.
pub fn aggregate(record: ElectionRecord) -> ElectionResult {
    let voter_addresses: BTreeSet<_> = record.voters.into_iter().collect();
    let candidate_addresses: BTreeSet<_> = record.candidates.iter().map(|c| c.address).collect();

    let candidates = rank_candidates(record.candidates);

    ElectionResult {
        name: record.name,
        owner: record.owner,
        candidate_fee_wei: record.candidate_fee,
        start_time: record.start_time,
        end_time: record.end_time,
        closed: record.closed,
        voter_addresses,
        candidates,
        candidate_addresses,
    }
}

/// Sort by votes, highest first, and assign dense ranks.
///
/// The sort is stable, so candidates with equal votes stay in ledger order.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<RankedCandidate> {
    candidates.sort_by(|a, b| b.votes.cmp(&a.votes));

    let ranks = dense_ranks(candidates.iter().map(|c| c.votes));
    candidates
        .into_iter()
        .zip(ranks)
        .map(|(candidate, rank)| RankedCandidate { candidate, rank })
        .collect()
}

/// Dense ranks for a vote sequence already sorted in non-increasing order.
pub fn dense_ranks<I>(sorted_votes: I) -> Vec<u32>
where
    I: IntoIterator<Item = u64>,
{
    let mut ranks = Vec::new();
    let mut previous: Option<(u64, u32)> = None;

    for votes in sorted_votes {
        let rank = match previous {
            None => 1,
            Some((prev_votes, prev_rank)) if prev_votes == votes => prev_rank,
            Some((_, prev_rank)) => prev_rank + 1,
        };
        ranks.push(rank);
        previous = Some((votes, rank));
    }

    ranks
}
