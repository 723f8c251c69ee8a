//! End-to-end demo: issuance, sale, governance, clawback
//!
//! Drives one asset through its full lifecycle against an in-memory
//! payment ledger and prints the notification records as JSON lines.

use asset_ledger::{HolderId, InMemoryPaymentLedger, PaymentLedger, ProtocolParams, SystemClock};
use registry::Registry;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting PlotShare demo");

    let root = HolderId::new("registry-root");
    let seller = HolderId::new("seller");
    let alice = HolderId::new("alice");
    let bob = HolderId::new("bob");

    let mut registry = Registry::new(
        root.clone(),
        HolderId::new("registry-operator"),
        HolderId::new("platform-reserve"),
        ProtocolParams::from_env()?,
        Arc::new(SystemClock),
    )?;

    let mut payment = InMemoryPaymentLedger::new();
    payment.credit(&alice, Decimal::from(50_000));
    payment.credit(&bob, Decimal::from(50_000));

    // Issue: 150k units, 20% seller floor, price 1
    let asset_id = registry.issue_asset(
        &root,
        "12 Harbour Street",
        "HARB12",
        150_000,
        seller.clone(),
        30_000,
        Decimal::ONE,
    )?;

    // Alice reserves, acknowledges, and completes the purchase
    registry.reserve(&alice, asset_id, 2_000, &mut payment)?;
    registry.acknowledge_disclaimer(&alice, asset_id)?;
    registry.purchase(&alice, asset_id, 2_000, &mut payment)?;

    // Bob buys outright
    registry.acknowledge_disclaimer(&bob, asset_id)?;
    registry.purchase(&bob, asset_id, 5_000, &mut payment)?;

    // Governance: both holders vote with their live balances
    let proposal = registry.create_proposal(&root, asset_id, "replace the roof")?;
    registry.vote(&alice, asset_id, proposal, true)?;
    registry.vote(&bob, asset_id, proposal, false)?;
    let passed = registry.finalize_proposal(&root, asset_id, proposal)?;
    tracing::info!(proposal, passed, "proposal finalized");

    // Wrap up the sale and sweep the raise to the seller
    registry.end_sale_early(&root, asset_id)?;
    registry.withdraw_payment(&root, asset_id, &mut payment)?;
    tracing::info!(
        seller_raise = %payment.balance_of(&seller),
        "sale closed"
    );

    // Off-ledger observer drains the notification records
    for event in registry.drain_events(asset_id)? {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}
