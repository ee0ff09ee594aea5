use crate::*;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use log::{info, warn};
use std::convert::TryFrom;

/// Sequential candidate identifier, starting at 1
pub type CandidateId = u64;

/// Reserved candidate id meaning "no selection"
pub const NO_CANDIDATE: CandidateId = 0;

/// A registered voter
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub address: Address,
    pub is_registered: bool,

    /// Flips to true exactly once, on the voter's only successful vote
    pub has_voted: bool,
    pub voted_candidate_id: Option<CandidateId>,
}

/// A candidate standing in the election
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub description: String,

    /// Unique across all candidates
    pub wallet_address: Address,
    pub vote_count: u64,
}

/// A single election
///
/// The election owns every voter and candidate record. All mutating operations take the
/// identity of the caller explicitly and check every guard before touching any state, so
/// a failed operation never leaves a partial change behind.
///
/// `Election` itself is not synchronized; share it between threads through an
/// [`ElectionRegistry`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Election {
    owner: Address,
    stage: Stage,
    created_at: DateTime<Utc>,
    voting_duration: u64,
    voting_deadline: DateTime<Utc>,

    /// Voters in registration order.
    ///
    /// Hashmaps are not allowed because their unstable ordering leads to non-determinism.
    voters: IndexMap<Address, Voter>,

    /// Candidates in id order; the candidate with id `n` lives at index `n - 1`
    candidates: Vec<Candidate>,
}

impl Election {
    /// Create a new election owned by `owner`, in the Registration stage.
    ///
    /// The voting deadline is `created_at + voting_duration` seconds. It is informational
    /// only: stages are advanced by the owner, never by the clock.
    pub fn new(
        owner: Address,
        voting_duration: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ElectionError> {
        let voting_deadline = i64::try_from(voting_duration)
            .ok()
            .filter(|secs| *secs > 0 && *secs <= i64::MAX / 1000)
            .and_then(|secs| created_at.checked_add_signed(Duration::seconds(secs)))
            .ok_or(ElectionError::InvalidVotingDuration)?;

        info!(
            "election created by {} with a voting duration of {}s",
            owner, voting_duration
        );

        Ok(Election {
            owner,
            stage: Stage::Registration,
            created_at,
            voting_duration,
            voting_deadline,
            voters: IndexMap::new(),
            candidates: Vec::new(),
        })
    }

    /// Create a new election starting now
    pub fn create(owner: Address, voting_duration: u64) -> Result<Self, ElectionError> {
        Self::new(owner, voting_duration, Utc::now())
    }

    // Mutating operations
    // -------------------

    /// Register `voter` as eligible to vote
    pub fn register_voter(&mut self, caller: Address, voter: Address) -> Result<(), ElectionError> {
        self.only_owner(caller)
            .and_then(|_| self.at_stage(Stage::Registration))
            .and_then(|_| {
                if self.voters.contains_key(&voter) {
                    Err(ElectionError::AlreadyRegistered(Registrant::Voter))
                } else {
                    Ok(())
                }
            })
            .map_err(|e| rejected("registerVoter", &caller, e))?;

        self.voters.insert(
            voter,
            Voter {
                address: voter,
                is_registered: true,
                has_voted: false,
                voted_candidate_id: None,
            },
        );
        info!("registered voter {} ({} total)", voter, self.voters.len());

        Ok(())
    }

    /// Add a candidate, returning its newly allocated id
    pub fn add_candidate(
        &mut self,
        caller: Address,
        name: &str,
        description: &str,
        wallet_address: Address,
    ) -> Result<CandidateId, ElectionError> {
        self.only_owner(caller)
            .and_then(|_| self.at_stage(Stage::Registration))
            .and_then(|_| {
                if name.trim().is_empty() {
                    return Err(ElectionError::EmptyCandidateName);
                }
                if self
                    .candidates
                    .iter()
                    .any(|c| c.wallet_address == wallet_address)
                {
                    return Err(ElectionError::AlreadyRegistered(Registrant::Candidate));
                }
                Ok(())
            })
            .map_err(|e| rejected("addCandidate", &caller, e))?;

        let id = self.candidates.len() as CandidateId + 1;
        self.candidates.push(Candidate {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            wallet_address,
            vote_count: 0,
        });
        info!("added candidate {} \"{}\" ({})", id, name, wallet_address);

        Ok(id)
    }

    /// Move the election to `target`.
    ///
    /// Any later stage may be jumped to directly. Re-selecting the current stage is a no-op,
    /// moving backwards is an `InvalidStageTransition`.
    pub fn change_stage(&mut self, caller: Address, target: Stage) -> Result<(), ElectionError> {
        self.only_owner(caller)
            .and_then(|_| {
                if self.stage.can_advance_to(target) {
                    Ok(())
                } else {
                    Err(ElectionError::InvalidStageTransition {
                        from: self.stage,
                        to: target,
                    })
                }
            })
            .map_err(|e| rejected("changeStage", &caller, e))?;

        let previous = self.stage;
        self.stage = target;
        info!("election stage changed from {} to {}", previous, target);

        Ok(())
    }

    /// Cast the caller's one and only vote
    pub fn vote(&mut self, caller: Address, candidate_id: CandidateId) -> Result<(), ElectionError> {
        let index = self
            .check_vote(caller, candidate_id)
            .map_err(|e| rejected("vote", &caller, e))?;

        // The voter flag and the candidate count change together or not at all
        if let Some(voter) = self.voters.get_mut(&caller) {
            voter.has_voted = true;
            voter.voted_candidate_id = Some(candidate_id);
            self.candidates[index].vote_count += 1;
        }
        info!("voter {} voted for candidate {}", caller, candidate_id);

        Ok(())
    }

    // Queries
    // -------

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn current_stage(&self) -> Stage {
        self.stage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Configured voting duration in seconds
    pub fn voting_duration(&self) -> u64 {
        self.voting_duration
    }

    pub fn voting_deadline(&self) -> DateTime<Utc> {
        self.voting_deadline
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.voting_deadline
    }

    pub fn total_voters(&self) -> usize {
        self.voters.len()
    }

    pub fn total_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn voter(&self, address: &Address) -> Option<&Voter> {
        self.voters.get(address)
    }

    /// All voters in registration order
    pub fn voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters.values()
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.voters.contains_key(address)
    }

    pub fn has_voted(&self, address: &Address) -> bool {
        self.voters.get(address).map_or(false, |v| v.has_voted)
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidate_index(id).map(|index| &self.candidates[index])
    }

    /// Every candidate with its vote count, in id order.
    ///
    /// Readable at any stage, but only final once the election has reached Tallying.
    pub fn results(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Whether voting has closed, making the results final
    pub fn is_final(&self) -> bool {
        self.stage >= Stage::Tallying
    }

    pub fn total_votes_cast(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// The candidate with the most votes. Ties go to the lowest id.
    pub fn leader(&self) -> Option<&Candidate> {
        self.candidates
            .iter()
            .fold(None, |best: Option<&Candidate>, candidate| match best {
                Some(best) if best.vote_count >= candidate.vote_count => Some(best),
                _ => Some(candidate),
            })
    }

    /// Check the invariants of a decoded election.
    ///
    /// Operations maintain these on their own; this is for elections read back from
    /// outside, e.g. a state file.
    pub fn validate(&self) -> Result<(), Error> {
        let corrupt = |msg: String| Err(Error::CorruptElection(msg));

        let expected_deadline = i64::try_from(self.voting_duration)
            .ok()
            .filter(|secs| *secs > 0 && *secs <= i64::MAX / 1000)
            .and_then(|secs| self.created_at.checked_add_signed(Duration::seconds(secs)));
        if expected_deadline != Some(self.voting_deadline) {
            return corrupt("voting deadline does not match the voting duration".to_owned());
        }

        let mut wallets = std::collections::BTreeSet::new();
        for (index, candidate) in self.candidates.iter().enumerate() {
            if candidate.id != index as CandidateId + 1 {
                return corrupt(format!(
                    "candidate at position {} has id {}",
                    index + 1,
                    candidate.id
                ));
            }
            if !wallets.insert(candidate.wallet_address) {
                return corrupt(format!(
                    "wallet {} backs more than one candidate",
                    candidate.wallet_address
                ));
            }
        }

        let mut ballots = vec![0u64; self.candidates.len()];
        for (address, voter) in self.voters.iter() {
            if *address != voter.address {
                return corrupt(format!("voter {} is filed under {}", voter.address, address));
            }
            if !voter.is_registered {
                return corrupt(format!("voter {} is not marked registered", address));
            }
            match (voter.has_voted, voter.voted_candidate_id) {
                (false, None) => {}
                (true, Some(id)) => match self.candidate_index(id) {
                    Some(index) => ballots[index] += 1,
                    None => {
                        return corrupt(format!(
                            "voter {} voted for unknown candidate {}",
                            address, id
                        ))
                    }
                },
                _ => {
                    return corrupt(format!(
                        "voter {} has an inconsistent vote record",
                        address
                    ))
                }
            }
        }

        for (candidate, ballots) in self.candidates.iter().zip(ballots) {
            if candidate.vote_count != ballots {
                return corrupt(format!(
                    "candidate {} has {} votes but {} voters chose it",
                    candidate.id, candidate.vote_count, ballots
                ));
            }
        }

        Ok(())
    }

    // Guards
    // ------

    fn only_owner(&self, caller: Address) -> Result<(), ElectionError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(ElectionError::Unauthorized)
        }
    }

    fn at_stage(&self, required: Stage) -> Result<(), ElectionError> {
        if self.stage == required {
            Ok(())
        } else {
            Err(ElectionError::InvalidStage {
                required,
                current: self.stage,
            })
        }
    }

    fn check_vote(&self, caller: Address, candidate_id: CandidateId) -> Result<usize, ElectionError> {
        let voter = self
            .voters
            .get(&caller)
            .ok_or(ElectionError::VoterNotRegistered)?;
        self.at_stage(Stage::Voting)?;
        if voter.has_voted {
            return Err(ElectionError::AlreadyVoted);
        }
        self.candidate_index(candidate_id)
            .ok_or(ElectionError::InvalidCandidate(candidate_id))
    }

    fn candidate_index(&self, id: CandidateId) -> Option<usize> {
        if id == NO_CANDIDATE {
            return None;
        }
        let index = usize::try_from(id - 1).ok()?;
        self.candidates
            .get(index)
            .filter(|c| c.id == id)
            .map(|_| index)
    }
}

fn rejected(operation: &str, caller: &Address, err: ElectionError) -> ElectionError {
    warn!("{} from {} rejected: {}", operation, caller, err);
    err
}
