//! Fungible balance bookkeeping for one asset
//!
//! Supply conservation is structural: every mutation is either a mint
//! (which grows `total_supply` by the minted amount) or a
//! balance-preserving move between two holders.

use crate::{
    types::{HolderId, Units},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-holder balances and the running total supply
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BalanceBook {
    balances: HashMap<HolderId, Units>,
    total_supply: Units,
}

impl BalanceBook {
    /// Empty book with zero supply
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of a holder (zero for unknown holders)
    pub fn balance_of(&self, holder: &HolderId) -> Units {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Current total supply
    pub fn total_supply(&self) -> Units {
        self.total_supply
    }

    /// Mint new units to a holder, growing total supply
    pub fn mint(&mut self, to: &HolderId, amount: Units) -> Result<()> {
        if to.is_null() {
            return Err(Error::InvalidRecipient("mint to null holder".to_string()));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount("mint amount must be positive".to_string()));
        }

        *self.balances.entry(to.clone()).or_insert(0) += amount;
        self.total_supply += amount;
        Ok(())
    }

    /// Move units between holders without touching total supply.
    ///
    /// This is the raw primitive: policy checks (guard) are the caller's
    /// responsibility and must run before this commits.
    pub fn transfer(&mut self, from: &HolderId, to: &HolderId, amount: Units) -> Result<()> {
        if to.is_null() {
            return Err(Error::InvalidRecipient("transfer to null holder".to_string()));
        }

        let available = self.balance_of(from);
        if available < amount {
            return Err(Error::InsufficientBalance {
                holder: from.to_string(),
                available,
                requested: amount,
            });
        }

        *self.balances.get_mut(from).expect("balance checked above") -= amount;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }

    /// Iterate over holders with a nonzero balance
    pub fn holders(&self) -> impl Iterator<Item = (&HolderId, Units)> {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(holder, amount)| (holder, *amount))
    }

    /// Verify supply conservation: sum of balances equals total supply
    pub fn check_conservation(&self) -> Result<()> {
        let sum: u128 = self.balances.values().map(|a| u128::from(*a)).sum();
        if sum != u128::from(self.total_supply) {
            return Err(Error::InvariantViolation(format!(
                "sum of balances {} != total supply {}",
                sum, self.total_supply
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_grows_supply() {
        let mut book = BalanceBook::new();
        let alice = HolderId::new("alice");

        book.mint(&alice, 1_000).unwrap();
        assert_eq!(book.balance_of(&alice), 1_000);
        assert_eq!(book.total_supply(), 1_000);
        book.check_conservation().unwrap();
    }

    #[test]
    fn test_mint_to_null_rejected() {
        let mut book = BalanceBook::new();
        let result = book.mint(&HolderId::new(""), 100);
        assert!(matches!(result, Err(Error::InvalidRecipient(_))));
    }

    #[test]
    fn test_transfer_conserves_supply() {
        let mut book = BalanceBook::new();
        let alice = HolderId::new("alice");
        let bob = HolderId::new("bob");

        book.mint(&alice, 500).unwrap();
        book.transfer(&alice, &bob, 200).unwrap();

        assert_eq!(book.balance_of(&alice), 300);
        assert_eq!(book.balance_of(&bob), 200);
        assert_eq!(book.total_supply(), 500);
        book.check_conservation().unwrap();
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut book = BalanceBook::new();
        let alice = HolderId::new("alice");
        let bob = HolderId::new("bob");

        book.mint(&alice, 100).unwrap();
        let result = book.transfer(&alice, &bob, 101);
        assert!(matches!(result, Err(Error::InsufficientBalance { .. })));
        // failed transfer left nothing behind
        assert_eq!(book.balance_of(&alice), 100);
        assert_eq!(book.balance_of(&bob), 0);
    }
}
