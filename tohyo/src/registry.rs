use crate::*;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A thread-safe handle to a single election
///
/// Every operation runs under one lock, so check-then-act sequences (uniqueness checks
/// before inserts, the has-voted check before the count increment) cannot interleave.
/// Reads return owned copies.
#[derive(Debug)]
pub struct ElectionRegistry {
    inner: Mutex<Election>,
}

impl ElectionRegistry {
    /// Create a new election owned by `owner`, starting now
    pub fn new(owner: Address, voting_duration: u64) -> Result<Self, ElectionError> {
        Ok(Election::create(owner, voting_duration)?.into())
    }

    pub fn register_voter(&self, caller: Address, voter: Address) -> Result<(), ElectionError> {
        self.lock().register_voter(caller, voter)
    }

    pub fn add_candidate(
        &self,
        caller: Address,
        name: &str,
        description: &str,
        wallet_address: Address,
    ) -> Result<CandidateId, ElectionError> {
        self.lock()
            .add_candidate(caller, name, description, wallet_address)
    }

    pub fn change_stage(&self, caller: Address, target: Stage) -> Result<(), ElectionError> {
        self.lock().change_stage(caller, target)
    }

    pub fn vote(&self, caller: Address, candidate_id: CandidateId) -> Result<(), ElectionError> {
        self.lock().vote(caller, candidate_id)
    }

    pub fn results(&self) -> Vec<Candidate> {
        self.lock().results().to_vec()
    }

    pub fn leader(&self) -> Option<Candidate> {
        self.lock().leader().cloned()
    }

    pub fn total_voters(&self) -> usize {
        self.lock().total_voters()
    }

    pub fn total_candidates(&self) -> usize {
        self.lock().total_candidates()
    }

    pub fn total_votes_cast(&self) -> u64 {
        self.lock().total_votes_cast()
    }

    pub fn current_stage(&self) -> Stage {
        self.lock().current_stage()
    }

    pub fn owner(&self) -> Address {
        self.lock().owner()
    }

    pub fn voting_deadline(&self) -> DateTime<Utc> {
        self.lock().voting_deadline()
    }

    pub fn voter(&self, address: &Address) -> Option<Voter> {
        self.lock().voter(address).cloned()
    }

    pub fn candidate(&self, id: CandidateId) -> Option<Candidate> {
        self.lock().candidate(id).cloned()
    }

    /// A copy of the whole election, e.g. for persisting to a [`Store`]
    pub fn snapshot(&self) -> Election {
        self.lock().clone()
    }

    pub fn into_inner(self) -> Election {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // Operations never leave a half-applied change behind, so a poisoned lock still
    // guards a consistent election.
    fn lock(&self) -> MutexGuard<'_, Election> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Election> for ElectionRegistry {
    fn from(election: Election) -> Self {
        ElectionRegistry {
            inner: Mutex::new(election),
        }
    }
}
