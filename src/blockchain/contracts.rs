//! Solidity interfaces of the election contracts.
//!
//! Three interfaces are involved:
//! - the manager, which creates elections and owns them
//! - the aggregator, which returns denormalized election data in one call
//! - the election contract itself, which takes candidacies and pays out revenue

use alloy::sol;

sol! {
    /// Election manager contract.
    interface IElectionManager {
        function createElection(string name, uint256 endTime) external;
    }

    /// Read-only aggregator over every election of a manager.
    interface IElectionAggregator {
        /// Candidate as stored on-chain: `(voteCount, name, address)`.
        #[derive(Debug, PartialEq, Eq)]
        struct RawCandidate {
            uint256 votes;
            string name;
            address candidateAddress;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct ElectionBundle {
            address electionAddress;
            string name;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct RawElectionData {
            string name;
            address[] voters;
            RawCandidate[] candidates;
            address owner;
            uint256 candidateFee;
            uint256 endTime;
            uint256 startTime;
            bool closed;
        }

        function getElectionsBundledWithNames(address manager) external view returns (ElectionBundle[] memory);
        function getElectionData(address election) external view returns (RawElectionData memory);
    }

    /// A single election deployed by the manager.
    interface IElection {
        function runForElection(string candidateName) external payable;
        function withdrawRevenue() external;
    }
}

pub use IElectionAggregator::{ElectionBundle, RawCandidate, RawElectionData};
