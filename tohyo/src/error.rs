use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("tohyo: election error: {0}")]
    Election(#[from] ElectionError),

    #[error("tohyo: invalid address - invalid hexidecimal")]
    AddressBadHex,

    #[error("tohyo: invalid address - wrong length")]
    AddressBadLen,

    #[error("tohyo: unknown stage: {0}")]
    UnknownStage(String),

    #[error("tohyo: no election has been deployed to this store")]
    ElectionNotFound,

    #[error("tohyo: corrupt election state: {0}")]
    CorruptElection(String),

    #[error("tohyo: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tohyo: CBOR error: {0}")]
    CBOR(#[from] serde_cbor::Error),

    #[error("tohyo: JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error("tohyo: error deserializing election: unknown format")]
    DeserializationUnknownFormat,
}

/// Which kind of registration collided
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Registrant {
    Voter,
    Candidate,
}

impl std::fmt::Display for Registrant {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Registrant::Voter => "Voter",
            Registrant::Candidate => "Candidate",
        };
        write!(f, "{}", name)
    }
}

/// Guard violations raised by election operations.
///
/// Every one of these aborts the operation before any state is touched.
/// Retrying with the same arguments reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("Only owner can call this function")]
    Unauthorized,

    #[error("Invalid stage: requires {required}, election is in {current}")]
    InvalidStage { required: Stage, current: Stage },

    #[error("Invalid stage transition from {from} to {to}")]
    InvalidStageTransition { from: Stage, to: Stage },

    #[error("{0} already registered")]
    AlreadyRegistered(Registrant),

    #[error("Voter not registered")]
    VoterNotRegistered,

    #[error("Voter already voted")]
    AlreadyVoted,

    #[error("Invalid candidate: {0}")]
    InvalidCandidate(CandidateId),

    #[error("Candidate name cannot be empty")]
    EmptyCandidateName,

    #[error("Voting duration must be a positive number of seconds")]
    InvalidVotingDuration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_messages() {
        assert_eq!(
            ElectionError::Unauthorized.to_string(),
            "Only owner can call this function"
        );
        assert_eq!(
            ElectionError::AlreadyRegistered(Registrant::Voter).to_string(),
            "Voter already registered"
        );
        assert_eq!(
            ElectionError::AlreadyRegistered(Registrant::Candidate).to_string(),
            "Candidate already registered"
        );
        assert_eq!(
            ElectionError::VoterNotRegistered.to_string(),
            "Voter not registered"
        );
        assert_eq!(ElectionError::AlreadyVoted.to_string(), "Voter already voted");

        let err = ElectionError::InvalidStage {
            required: Stage::Voting,
            current: Stage::Registration,
        };
        assert_eq!(
            err.to_string(),
            "Invalid stage: requires voting, election is in registration"
        );
    }

    #[test]
    fn wraps_election_errors() {
        let err: Error = ElectionError::AlreadyVoted.into();
        assert_eq!(err.to_string(), "tohyo: election error: Voter already voted");
    }
}
