//! Election subsystem.
//!
//! # Data Flow
//! ```text
//! read:  aggregator call → decode.rs (typed record) → ranking.rs (ElectionResult)
//! write: service.rs (TxIntent) → blockchain::transaction (TxSubmitter)
//! ```

pub mod decode;
pub mod ranking;
pub mod service;
pub mod types;

pub use ranking::{aggregate, aggregate_raw, dense_ranks};
pub use service::{ElectionClient, CANDIDATE_STAKE_WEI};
pub use types::{
    Candidate, ClientResult, ElectionError, ElectionRecord, ElectionRef, ElectionResult,
    RankedCandidate,
};
