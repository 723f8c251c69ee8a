//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify the standing invariants:
//! - Supply conservation: sum of balances == total supply
//! - Seller floor: the seller never drops below it once a sale is configured
//! - Buyer cap: no non-seller holder exceeds 15% of the snapshotted supply
//! - Reservation accounting: reserved units never exceed the allocation
//! - Atomicity: a failed operation leaves no observable state change

use asset_ledger::{
    AssetLedger, HolderId, InMemoryPaymentLedger, ManualClock, PaymentLedger, ProtocolParams,
    SalePhase,
};
use chrono::Duration;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

const SUPPLY: u64 = 150_000;
const BENEFICIARY_CUT: u64 = 4_500; // 3%
const FLOOR: u64 = 30_000; // 20%
const FOR_SALE: u64 = SUPPLY - BENEFICIARY_CUT - FLOOR; // 115_500
const CAP: u64 = SUPPLY * 15 / 100; // 22_500

fn operator() -> HolderId {
    HolderId::new("operator")
}

fn seller() -> HolderId {
    HolderId::new("seller")
}

fn buyer(i: usize) -> HolderId {
    HolderId::new(format!("buyer{}", i))
}

fn open_ledger(clock: Arc<ManualClock>) -> AssetLedger {
    let mut ledger = AssetLedger::new(
        Uuid::now_v7(),
        "12 Harbour Street",
        "HARB12",
        seller(),
        operator(),
        HolderId::new("root"),
        HolderId::new("beneficiary"),
        ProtocolParams::default(),
        clock,
    )
    .unwrap();
    ledger
        .mint(&operator(), &HolderId::new("beneficiary"), BENEFICIARY_CUT)
        .unwrap();
    ledger
        .mint(&operator(), &seller(), SUPPLY - BENEFICIARY_CUT)
        .unwrap();
    ledger
        .configure_sale(&operator(), FOR_SALE, Decimal::ONE, FLOOR)
        .unwrap();
    ledger
}

fn funded_payment(buyers: usize) -> InMemoryPaymentLedger {
    let mut payment = InMemoryPaymentLedger::new();
    for i in 0..buyers {
        payment.credit(&buyer(i), Decimal::from(1_000_000u64));
    }
    payment
}

/// One randomly generated operation against the ledger
#[derive(Debug, Clone)]
enum Op {
    Acknowledge(usize),
    Reserve(usize, u64),
    Purchase(usize, u64),
    Transfer(usize, usize, u64),
    RefundExpired(usize),
    AdvanceDays(u8),
    EndSale,
}

fn op_strategy(buyers: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..buyers).prop_map(Op::Acknowledge),
        ((0..buyers), 1u64..5_000).prop_map(|(b, a)| Op::Reserve(b, a)),
        ((0..buyers), 1u64..25_000).prop_map(|(b, a)| Op::Purchase(b, a)),
        ((0..buyers), (0..buyers), 1u64..10_000).prop_map(|(f, t, a)| Op::Transfer(f, t, a)),
        (0..buyers).prop_map(Op::RefundExpired),
        (0u8..7).prop_map(Op::AdvanceDays),
        Just(Op::EndSale),
    ]
}

fn apply(
    ledger: &mut AssetLedger,
    payment: &mut InMemoryPaymentLedger,
    clock: &ManualClock,
    op: &Op,
) {
    // individual operations may fail; invariants must hold either way
    let result = match op {
        Op::Acknowledge(b) => ledger.acknowledge_disclaimer(&operator(), &buyer(*b)),
        Op::Reserve(b, amount) => ledger.reserve(&operator(), &buyer(*b), *amount, payment),
        Op::Purchase(b, amount) => ledger.purchase(&operator(), &buyer(*b), *amount, payment),
        Op::Transfer(from, to, amount) => ledger.transfer(&buyer(*from), &buyer(*to), *amount),
        Op::RefundExpired(b) => ledger.refund_expired(&operator(), &buyer(*b), payment),
        Op::AdvanceDays(days) => {
            clock.advance(Duration::days(i64::from(*days)));
            Ok(())
        }
        Op::EndSale => ledger.end_sale_early(&operator()),
    };
    let _ = result;
}

fn assert_invariants(ledger: &AssetLedger, buyers: usize) {
    // supply conservation
    let mut sum = ledger.balance_of(&seller())
        + ledger.balance_of(&HolderId::new("beneficiary"))
        + ledger.balance_of(&HolderId::new("root"));
    for i in 0..buyers {
        sum += ledger.balance_of(&buyer(i));
    }
    assert_eq!(sum, ledger.total_supply());
    assert_eq!(ledger.total_supply(), SUPPLY);

    // seller floor
    assert!(ledger.balance_of(&seller()) >= FLOOR);

    // buyer cap against the snapshot
    for i in 0..buyers {
        assert!(ledger.balance_of(&buyer(i)) <= CAP);
    }

    // reservation accounting while open
    let sale = ledger.sale();
    if sale.phase == SalePhase::Open {
        assert!(sale.total_reserved <= sale.units_for_sale);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: every reachable state satisfies the standing invariants
    #[test]
    fn prop_invariants_hold_under_random_operations(
        ops in prop::collection::vec(op_strategy(4), 1..60)
    ) {
        let clock = Arc::new(ManualClock::starting_now());
        let mut ledger = open_ledger(clock.clone());
        let mut payment = funded_payment(4);

        for op in &ops {
            apply(&mut ledger, &mut payment, &clock, op);
            assert_invariants(&ledger, 4);
        }
    }

    /// Property: reserve then purchase moves exactly n units for n*price,
    /// with no additional payment pulled
    #[test]
    fn prop_reserve_purchase_round_trip(amount in 1u64..22_500) {
        let clock = Arc::new(ManualClock::starting_now());
        let mut ledger = open_ledger(clock);
        let mut payment = funded_payment(1);
        let bob = buyer(0);
        let funds_before = payment.balance_of(&bob);

        ledger.reserve(&operator(), &bob, amount, &mut payment).unwrap();
        ledger.acknowledge_disclaimer(&operator(), &bob).unwrap();
        ledger.purchase(&operator(), &bob, amount, &mut payment).unwrap();

        prop_assert_eq!(ledger.balance_of(&bob), amount);
        prop_assert_eq!(ledger.sale().total_raised, Decimal::from(amount));
        // exactly one payment pull, at reservation time
        prop_assert_eq!(
            funds_before - payment.balance_of(&bob),
            Decimal::from(amount)
        );
    }

    /// Property: a purchase rejected by the buyer cap changes nothing
    #[test]
    fn prop_failed_purchase_is_atomic(excess in 1u64..10_000) {
        let clock = Arc::new(ManualClock::starting_now());
        let mut ledger = open_ledger(clock);
        let mut payment = funded_payment(1);
        let bob = buyer(0);
        ledger.acknowledge_disclaimer(&operator(), &bob).unwrap();
        let events_before = ledger.pending_events().len();
        let funds_before = payment.balance_of(&bob);

        let result = ledger.purchase(&operator(), &bob, CAP + excess, &mut payment);
        prop_assert!(result.is_err());

        prop_assert_eq!(ledger.balance_of(&bob), 0);
        prop_assert_eq!(ledger.sale().units_for_sale, FOR_SALE);
        prop_assert_eq!(ledger.sale().total_raised, Decimal::ZERO);
        prop_assert_eq!(payment.balance_of(&bob), funds_before);
        prop_assert_eq!(ledger.pending_events().len(), events_before);
    }

    /// Property: refunds return exactly the escrowed amount once expired
    #[test]
    fn prop_refund_returns_escrow(amount in 1u64..5_000, extra_days in 0i64..10) {
        let clock = Arc::new(ManualClock::starting_now());
        let mut ledger = open_ledger(clock.clone());
        let mut payment = funded_payment(1);
        let bob = buyer(0);
        let funds_before = payment.balance_of(&bob);

        ledger.reserve(&operator(), &bob, amount, &mut payment).unwrap();
        clock.advance(Duration::days(5) + Duration::days(extra_days));
        ledger.refund_expired(&operator(), &bob, &mut payment).unwrap();

        prop_assert_eq!(payment.balance_of(&bob), funds_before);
        prop_assert_eq!(ledger.sale().total_reserved, 0);
        prop_assert_eq!(ledger.balance_of(&bob), 0);
    }
}
