//! Append-only notification records
//!
//! Every committed state change appends exactly one record, named for the
//! mutation it reports. Off-ledger observers drain the log; draining never
//! affects core state and the core never reads the log back.

use crate::types::{HolderId, Units};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One committed state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the instance's log (starts at 0, gapless)
    pub seq: u64,

    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Commit timestamp
    pub at: DateTime<Utc>,

    /// What changed
    pub kind: EventKind,
}

/// Mutation taxonomy, one variant per committed state change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// Units minted during issuance
    Minted {
        /// Recipient
        to: HolderId,
        /// Minted units
        amount: Units,
    },
    /// Units moved between holders
    Transferred {
        /// Sender
        from: HolderId,
        /// Recipient
        to: HolderId,
        /// Moved units
        amount: Units,
    },
    /// Sale parameters set or replaced
    SaleConfigured {
        /// Units allocated to the sale
        units_for_sale: Units,
        /// Price per unit
        unit_price: Decimal,
        /// Protected seller floor
        target_seller_floor: Units,
        /// Supply snapshot taken at this configuration
        supply_snapshot: Units,
    },
    /// Holder acknowledged the risk disclaimer
    DisclaimerAcknowledged {
        /// Acknowledging holder
        holder: HolderId,
    },
    /// Units reserved with payment escrowed
    Reserved {
        /// Reserving holder
        holder: HolderId,
        /// Reserved units
        amount: Units,
        /// Escrowed payment
        cost: Decimal,
    },
    /// Purchase completed (reserved or fresh)
    Purchased {
        /// Buying holder
        holder: HolderId,
        /// Purchased units
        amount: Units,
        /// Payment credited to the raise
        cost: Decimal,
        /// True when the purchase consumed a prior reservation
        from_reservation: bool,
    },
    /// Expired reservation refunded
    ReservationRefunded {
        /// Refunded holder
        holder: HolderId,
        /// Released units
        amount: Units,
        /// Returned payment
        refund: Decimal,
    },
    /// Sale ended early by the operator
    SaleEnded {
        /// Allocation zeroed by the termination
        unsold_units: Units,
    },
    /// Escrowed payment swept to the seller
    PaymentWithdrawn {
        /// Swept amount
        amount: Decimal,
        /// Receiving seller
        seller: HolderId,
    },
    /// Seller identity reassigned
    SellerUpdated {
        /// Previous seller
        old: HolderId,
        /// New seller
        new: HolderId,
    },
    /// Full balance seized by the registry root
    ClawedBack {
        /// Holder whose balance was seized
        holder: HolderId,
        /// Seized units
        amount: Units,
    },
    /// Global transfer switch toggled
    TransfersToggled {
        /// New switch state
        enabled: bool,
    },
    /// Circuit breaker toggled
    PauseToggled {
        /// New paused state
        paused: bool,
    },
    /// Governance proposal created
    ProposalCreated {
        /// Proposal index
        proposal: u64,
        /// Description
        description: String,
    },
    /// Vote cast with live balance weight
    VoteCast {
        /// Proposal index
        proposal: u64,
        /// Voting holder
        holder: HolderId,
        /// Yes/no
        support: bool,
        /// Weight applied (voter's balance at vote time)
        weight: Units,
    },
    /// Proposal finalized (one-way)
    ProposalFinalized {
        /// Proposal index
        proposal: u64,
        /// Strict-majority outcome, ties lose
        passed: bool,
    },
}

/// Append-only event log for one ledger instance
#[derive(Debug, Default)]
pub struct EventLog {
    records: Vec<LedgerEvent>,
    next_seq: u64,
}

impl EventLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record; called exactly once per committed operation
    pub fn append(&mut self, at: DateTime<Utc>, kind: EventKind) {
        let record = LedgerEvent {
            seq: self.next_seq,
            event_id: Uuid::now_v7(),
            at,
            kind,
        };
        self.next_seq += 1;
        self.records.push(record);
    }

    /// Records appended since the last drain
    pub fn pending(&self) -> &[LedgerEvent] {
        &self.records
    }

    /// Total records ever appended
    pub fn total_appended(&self) -> u64 {
        self.next_seq
    }

    /// Hand all pending records to an observer, leaving the log empty.
    /// Sequence numbers keep counting across drains.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.records)
    }

    /// Export pending records as JSON lines for off-ledger observers
    pub fn to_json_lines(&self) -> crate::Result<String> {
        let mut out = String::new();
        for record in &self.records {
            let line = serde_json::to_string(record)
                .map_err(|e| crate::Error::Serialization(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}
