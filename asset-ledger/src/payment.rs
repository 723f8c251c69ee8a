//! Payment-asset collaborator boundary
//!
//! The sale engine escrows and releases payment through this trait. The
//! collaborator is a black box: a generic balance/transfer primitive that
//! either succeeds or aborts with no partial effect.

use crate::{error::PaymentError, types::HolderId};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// External payment-asset ledger the sale engine calls into
pub trait PaymentLedger {
    /// Payment balance of an account
    fn balance_of(&self, account: &HolderId) -> Decimal;

    /// Move payment between accounts; must succeed-or-abort atomically
    fn transfer(
        &mut self,
        from: &HolderId,
        to: &HolderId,
        amount: Decimal,
    ) -> Result<(), PaymentError>;
}

/// In-memory payment ledger for tests and demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentLedger {
    balances: HashMap<HolderId, Decimal>,
}

impl InMemoryPaymentLedger {
    /// Empty payment ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account (faucet, test setup only)
    pub fn credit(&mut self, account: &HolderId, amount: Decimal) {
        *self.balances.entry(account.clone()).or_insert(Decimal::ZERO) += amount;
    }
}

impl PaymentLedger for InMemoryPaymentLedger {
    fn balance_of(&self, account: &HolderId) -> Decimal {
        self.balances.get(account).copied().unwrap_or(Decimal::ZERO)
    }

    fn transfer(
        &mut self,
        from: &HolderId,
        to: &HolderId,
        amount: Decimal,
    ) -> Result<(), PaymentError> {
        if amount < Decimal::ZERO {
            return Err(PaymentError("negative amount".to_string()));
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(PaymentError(format!(
                "{} has {}, needs {}",
                from, available, amount
            )));
        }

        *self.balances.get_mut(from).expect("balance checked above") -= amount;
        *self.balances.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_transfer_moves_funds() {
        let mut ledger = InMemoryPaymentLedger::new();
        let alice = HolderId::new("alice");
        let escrow = HolderId::new("escrow");

        ledger.credit(&alice, Decimal::from(500));
        ledger.transfer(&alice, &escrow, Decimal::from(200)).unwrap();

        assert_eq!(ledger.balance_of(&alice), Decimal::from(300));
        assert_eq!(ledger.balance_of(&escrow), Decimal::from(200));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let mut ledger = InMemoryPaymentLedger::new();
        let alice = HolderId::new("alice");
        let escrow = HolderId::new("escrow");

        ledger.credit(&alice, Decimal::from(10));
        let result = ledger.transfer(&alice, &escrow, Decimal::from(11));
        assert!(result.is_err());
        // no partial effect
        assert_eq!(ledger.balance_of(&alice), Decimal::from(10));
        assert_eq!(ledger.balance_of(&escrow), Decimal::ZERO);
    }
}
