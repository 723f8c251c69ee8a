//! PlotShare Asset Ledger
//!
//! One asset's self-contained fractional-ownership state: fungible balance
//! book, transfer policy guard, primary sale with reservations and a
//! disclaimer workflow, and balance-weighted governance.
//!
//! # Architecture
//!
//! - **Atomic operations**: every mutation stages on a scratch copy and
//!   commits only after all invariants hold
//! - **Policy guard**: seller floor and buyer cap validated on every
//!   non-mint balance move, never mutating state
//! - **Append-only events**: one notification record per committed change,
//!   drained by off-ledger observers
//!
//! # Invariants
//!
//! - Supply conservation: sum of balances equals total supply at all times
//! - Seller floor: once a sale is configured, the seller never drops below it
//! - Buyer cap: no non-seller holder exceeds 15% of the snapshotted supply
//! - Reservation accounting: reserved units never exceed the allocation

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod balances;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod governance;
pub mod guard;
pub mod ledger;
pub mod payment;
pub mod sale;
pub mod types;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ProtocolParams;
pub use error::{Error, ErrorCategory, PaymentError, Result};
pub use events::{EventKind, LedgerEvent};
pub use ledger::AssetLedger;
pub use payment::{InMemoryPaymentLedger, PaymentLedger};
pub use sale::{Reservation, SalePhase, SaleState};
pub use types::{HolderId, Units};
