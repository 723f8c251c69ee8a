//! Transfer policy guard
//!
//! Pure validation over every non-mint balance move. The guard never
//! mutates state; the ledger commits only if the guard returns no failure.
//!
//! Rules, in order:
//! 1. transfers globally disabled -> `TransfersDisabled`
//! 2. seller would drop below the protected floor -> `SellerFloorViolation`
//! 3. recipient would exceed the concentration cap -> `BuyerCapExceeded`

use crate::{
    balances::BalanceBook,
    types::{HolderId, Units},
    Error, Result,
};

/// Snapshot of the policy inputs a single guard check needs
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    /// Global transfer switch
    pub transfers_enabled: bool,

    /// Current seller identity
    pub seller: &'a HolderId,

    /// Protected seller floor (zero until a sale is configured)
    pub target_seller_floor: Units,

    /// Denominator for the buyer cap: the sale snapshot if one exists,
    /// otherwise the current total supply
    pub cap_supply: Units,

    /// Maximum percent of `cap_supply` a non-seller may hold
    pub max_buyer_percent: u8,
}

/// Validate a proposed transfer against the policy rules
pub fn check_transfer(
    ctx: &GuardContext<'_>,
    book: &BalanceBook,
    from: &HolderId,
    to: &HolderId,
    amount: Units,
) -> Result<()> {
    // Rule 1: global switch. Mint/burn (null endpoints) are exempt, but
    // those paths never reach the guard in the first place.
    if !ctx.transfers_enabled && !from.is_null() && !to.is_null() {
        return Err(Error::TransfersDisabled);
    }

    // Rule 2: seller floor
    if from == ctx.seller {
        let balance = book.balance_of(from);
        if balance < amount || balance - amount < ctx.target_seller_floor {
            return Err(Error::SellerFloorViolation {
                balance,
                amount,
                floor: ctx.target_seller_floor,
            });
        }
    }

    // Rule 3: buyer cap (the seller is exempt as recipient)
    if to != ctx.seller {
        let cap = buyer_cap(ctx.cap_supply, ctx.max_buyer_percent);
        let would_hold = u128::from(book.balance_of(to)) + u128::from(amount);
        if would_hold > cap {
            return Err(Error::BuyerCapExceeded {
                holder: to.to_string(),
                would_hold: would_hold.min(u128::from(u64::MAX)) as u64,
                cap: cap.min(u128::from(u64::MAX)) as u64,
            });
        }
    }

    Ok(())
}

/// Maximum balance a non-seller holder may reach
pub fn buyer_cap(cap_supply: Units, max_buyer_percent: u8) -> u128 {
    u128::from(cap_supply) * u128::from(max_buyer_percent) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with(entries: &[(&str, Units)]) -> BalanceBook {
        let mut book = BalanceBook::new();
        for (holder, amount) in entries {
            book.mint(&HolderId::new(*holder), *amount).unwrap();
        }
        book
    }

    fn ctx<'a>(seller: &'a HolderId, floor: Units, supply: Units) -> GuardContext<'a> {
        GuardContext {
            transfers_enabled: true,
            seller,
            target_seller_floor: floor,
            cap_supply: supply,
            max_buyer_percent: 15,
        }
    }

    #[test]
    fn test_transfers_disabled() {
        let seller = HolderId::new("seller");
        let book = book_with(&[("seller", 1_000)]);
        let mut context = ctx(&seller, 0, 1_000);
        context.transfers_enabled = false;

        let result = check_transfer(&context, &book, &seller, &HolderId::new("bob"), 10);
        assert!(matches!(result, Err(Error::TransfersDisabled)));
    }

    #[test]
    fn test_seller_floor_enforced() {
        let seller = HolderId::new("seller");
        let book = book_with(&[("seller", 1_000)]);
        let context = ctx(&seller, 900, 1_000);

        // 1000 - 101 < 900
        let result = check_transfer(&context, &book, &seller, &HolderId::new("bob"), 101);
        assert!(matches!(result, Err(Error::SellerFloorViolation { .. })));

        // 1000 - 100 == 900, exactly at the floor is allowed
        check_transfer(&context, &book, &seller, &HolderId::new("bob"), 100).unwrap();
    }

    #[test]
    fn test_buyer_cap_enforced() {
        let seller = HolderId::new("seller");
        let book = book_with(&[("seller", 850), ("bob", 150)]);
        let context = ctx(&seller, 0, 1_000);

        // bob is exactly at 15% of 1000
        let result = check_transfer(&context, &book, &seller, &HolderId::new("bob"), 1);
        assert!(matches!(result, Err(Error::BuyerCapExceeded { .. })));
    }

    #[test]
    fn test_seller_exempt_from_cap() {
        let seller = HolderId::new("seller");
        let book = book_with(&[("seller", 200), ("bob", 800)]);
        let context = ctx(&seller, 0, 1_000);

        // returning units to the seller ignores the cap
        check_transfer(&context, &book, &HolderId::new("bob"), &seller, 500).unwrap();
    }

    #[test]
    fn test_cap_uses_snapshot_supply() {
        let seller = HolderId::new("seller");
        let book = book_with(&[("seller", 2_000)]);
        // snapshot 1000 even though live supply is 2000: cap stays 150
        let context = ctx(&seller, 0, 1_000);

        let result = check_transfer(&context, &book, &seller, &HolderId::new("bob"), 151);
        assert!(matches!(result, Err(Error::BuyerCapExceeded { .. })));
        check_transfer(&context, &book, &seller, &HolderId::new("bob"), 150).unwrap();
    }
}
