//! Boundary decoding of aggregator return data.
//!
//! Wire structs from `blockchain::contracts` stop here. Every field is
//! checked and converted; nothing positional or unvalidated travels further.

use alloy::primitives::{Address, U256};

use crate::blockchain::contracts::{ElectionBundle, RawCandidate, RawElectionData};
use crate::blockchain::{LedgerError, LedgerResult};
use crate::election::types::{Candidate, ElectionRecord, ElectionRef};

/// Validate and convert one `getElectionData` result.
pub fn decode_election(raw: RawElectionData) -> LedgerResult<ElectionRecord> {
    let owner = non_zero("owner", raw.owner)?;
    let end_time = to_u64("endTime", raw.endTime)?;
    let start_time = to_u64("startTime", raw.startTime)?;

    let voters = raw
        .voters
        .into_iter()
        .enumerate()
        .map(|(i, voter)| non_zero_at("voters", i, voter))
        .collect::<LedgerResult<Vec<_>>>()?;

    let candidates = raw
        .candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| decode_candidate(i, candidate))
        .collect::<LedgerResult<Vec<_>>>()?;

    Ok(ElectionRecord {
        name: raw.name,
        voters,
        candidates,
        owner,
        candidate_fee: raw.candidateFee,
        end_time,
        start_time,
        closed: raw.closed,
    })
}

/// Validate and convert one `(electionAddress, name)` bundle.
pub fn decode_bundle(bundle: ElectionBundle) -> LedgerResult<ElectionRef> {
    Ok(ElectionRef {
        address: non_zero("electionAddress", bundle.electionAddress)?,
        name: bundle.name,
    })
}

fn decode_candidate(index: usize, raw: RawCandidate) -> LedgerResult<Candidate> {
    let votes = u64::try_from(raw.votes).map_err(|_| {
        LedgerError::Decode(format!("candidates[{index}].votes out of range: {}", raw.votes))
    })?;
    Ok(Candidate {
        address: non_zero_at("candidates", index, raw.candidateAddress)?,
        name: raw.name,
        votes,
    })
}

fn to_u64(field: &str, value: U256) -> LedgerResult<u64> {
    u64::try_from(value)
        .map_err(|_| LedgerError::Decode(format!("{field} out of range: {value}")))
}

fn non_zero(field: &str, address: Address) -> LedgerResult<Address> {
    if address == Address::ZERO {
        return Err(LedgerError::Decode(format!("{field} is the zero address")));
    }
    Ok(address)
}

fn non_zero_at(field: &str, index: usize, address: Address) -> LedgerResult<Address> {
    non_zero(&format!("{field}[{index}]"), address)
}
