//! Lightweight on-ledger governance
//!
//! Append-only proposal list with balance-weighted voting. One concrete
//! module owned by the ledger instance; no dispatch hierarchy.

use crate::{
    types::{HolderId, Units},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A governance proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Free-form description
    pub description: String,

    /// Accumulated yes weight
    pub yes_weight: Units,

    /// Accumulated no weight
    pub no_weight: Units,

    /// Finalized proposals are immutable
    pub finalized: bool,

    /// Holders that already voted
    pub voted: HashMap<HolderId, bool>,
}

impl Proposal {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            yes_weight: 0,
            no_weight: 0,
            finalized: false,
            voted: HashMap::new(),
        }
    }

    /// Outcome after finalization: strict majority of cast weight, ties lose
    pub fn passed(&self) -> bool {
        self.yes_weight > self.no_weight
    }
}

/// Proposal list for one ledger instance
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GovernanceBook {
    proposals: Vec<Proposal>,
}

impl GovernanceBook {
    /// Empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a proposal, returning its index
    pub fn create_proposal(&mut self, description: impl Into<String>) -> u64 {
        self.proposals.push(Proposal::new(description));
        (self.proposals.len() - 1) as u64
    }

    /// Proposal by index
    pub fn proposal(&self, id: u64) -> Result<&Proposal> {
        self.proposals
            .get(id as usize)
            .ok_or(Error::ProposalNotFound(id))
    }

    /// Number of proposals ever created
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// True when no proposal exists yet
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Cast a vote with the given weight (the voter's live balance).
    ///
    /// Weight is read at vote time, not snapshotted at proposal creation:
    /// a holder who votes, transfers units away, and has the recipient vote
    /// applies the same stake twice.
    pub fn vote(&mut self, id: u64, holder: &HolderId, support: bool, weight: Units) -> Result<()> {
        let proposal = self
            .proposals
            .get_mut(id as usize)
            .ok_or(Error::ProposalNotFound(id))?;

        if proposal.finalized {
            return Err(Error::AlreadyFinalized(id));
        }
        if proposal.voted.contains_key(holder) {
            return Err(Error::AlreadyVoted {
                holder: holder.to_string(),
                proposal: id,
            });
        }
        if weight == 0 {
            return Err(Error::NoVotingPower(holder.to_string()));
        }

        if support {
            proposal.yes_weight += weight;
        } else {
            proposal.no_weight += weight;
        }
        proposal.voted.insert(holder.clone(), support);
        Ok(())
    }

    /// Mark a proposal finalized (one-way) and return the outcome
    pub fn finalize(&mut self, id: u64) -> Result<bool> {
        let proposal = self
            .proposals
            .get_mut(id as usize)
            .ok_or(Error::ProposalNotFound(id))?;

        if proposal.finalized {
            return Err(Error::AlreadyFinalized(id));
        }
        proposal.finalized = true;
        Ok(proposal.passed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_vote() {
        let mut book = GovernanceBook::new();
        let id = book.create_proposal("repaint the facade");
        assert_eq!(id, 0);

        book.vote(id, &HolderId::new("alice"), true, 100).unwrap();
        book.vote(id, &HolderId::new("bob"), false, 40).unwrap();

        let proposal = book.proposal(id).unwrap();
        assert_eq!(proposal.yes_weight, 100);
        assert_eq!(proposal.no_weight, 40);
    }

    #[test]
    fn test_double_vote_rejected() {
        let mut book = GovernanceBook::new();
        let id = book.create_proposal("new elevator");
        let alice = HolderId::new("alice");

        book.vote(id, &alice, true, 10).unwrap();
        let result = book.vote(id, &alice, false, 10);
        assert!(matches!(result, Err(Error::AlreadyVoted { .. })));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let mut book = GovernanceBook::new();
        let id = book.create_proposal("sell the roof");
        let result = book.vote(id, &HolderId::new("alice"), true, 0);
        assert!(matches!(result, Err(Error::NoVotingPower(_))));
    }

    #[test]
    fn test_finalize_one_way() {
        let mut book = GovernanceBook::new();
        let id = book.create_proposal("repaint the facade");
        book.vote(id, &HolderId::new("alice"), true, 100).unwrap();

        assert!(book.finalize(id).unwrap());
        assert!(matches!(book.finalize(id), Err(Error::AlreadyFinalized(_))));

        // finalized proposals reject further votes
        let result = book.vote(id, &HolderId::new("bob"), false, 50);
        assert!(matches!(result, Err(Error::AlreadyFinalized(_))));
    }

    #[test]
    fn test_tie_loses() {
        let mut book = GovernanceBook::new();
        let id = book.create_proposal("split the garden");
        book.vote(id, &HolderId::new("alice"), true, 50).unwrap();
        book.vote(id, &HolderId::new("bob"), false, 50).unwrap();
        assert!(!book.finalize(id).unwrap());
    }

    #[test]
    fn test_unknown_proposal() {
        let mut book = GovernanceBook::new();
        assert!(matches!(
            book.vote(7, &HolderId::new("alice"), true, 10),
            Err(Error::ProposalNotFound(7))
        ));
        assert!(matches!(book.finalize(7), Err(Error::ProposalNotFound(7))));
    }
}
