//! Sale and reservation bookkeeping
//!
//! Phase machine per ledger instance: `Unconfigured -> Open -> Ended`.
//! This module owns the sale parameters, the reservation map, and the
//! disclaimer set. It performs only bookkeeping and validation; balance
//! moves and payment escrow are orchestrated by the ledger, which commits
//! all of it atomically or not at all.

use crate::{
    config::ProtocolParams,
    types::{HolderId, Units},
    Error, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Sale phase for one ledger instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalePhase {
    /// No sale parameters set yet
    Unconfigured,
    /// Sale configured, reservations and purchases allowed
    Open,
    /// Sale ended (one-way), remaining allocation zeroed
    Ended,
}

/// A buyer's escrowed, time-boxed claim on sale units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Reserved unit count
    pub amount: Units,

    /// Creation timestamp; expiry is checked against this on refund
    pub created_at: DateTime<Utc>,
}

/// Sale parameters, running totals, reservations, and disclaimers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleState {
    /// Current phase
    pub phase: SalePhase,

    /// Price per ownership unit, in payment-asset terms
    pub unit_price: Decimal,

    /// Units still allocated to the primary sale
    pub units_for_sale: Units,

    /// Minimum balance the seller must retain after any sale-path transfer
    pub target_seller_floor: Units,

    /// Total payment credited across all purchases
    pub total_raised: Decimal,

    /// Units currently locked under live reservations
    pub total_reserved: Units,

    /// Total supply frozen at the most recent sale configuration.
    /// Fixed denominator for the buyer cap once a sale has ever opened.
    pub supply_snapshot_at_sale_open: Units,

    /// Live reservations, at most one per holder
    pub reservations: HashMap<HolderId, Reservation>,

    /// Holders that acknowledged the risk disclaimer (set once, never cleared)
    pub disclaimers: HashSet<HolderId>,
}

impl SaleState {
    /// Fresh, unconfigured sale state
    pub fn new() -> Self {
        Self {
            phase: SalePhase::Unconfigured,
            unit_price: Decimal::ZERO,
            units_for_sale: 0,
            target_seller_floor: 0,
            total_raised: Decimal::ZERO,
            total_reserved: 0,
            supply_snapshot_at_sale_open: 0,
            reservations: HashMap::new(),
            disclaimers: HashSet::new(),
        }
    }

    /// Units still available for new reservations or fresh purchases
    pub fn unreserved_allocation(&self) -> Units {
        self.units_for_sale.saturating_sub(self.total_reserved)
    }

    /// True once a sale has ever been configured
    pub fn has_snapshot(&self) -> bool {
        self.supply_snapshot_at_sale_open > 0
    }

    /// True if the holder acknowledged the disclaimer
    pub fn disclaimer_acknowledged(&self, holder: &HolderId) -> bool {
        self.disclaimers.contains(holder)
    }

    /// Cost of `amount` units at the current price.
    /// Fails rather than panics when the product is not representable.
    pub fn cost_of(&self, amount: Units) -> Result<Decimal> {
        Decimal::from(amount)
            .checked_mul(self.unit_price)
            .ok_or_else(|| {
                Error::InvalidPrice(format!(
                    "cost of {} units at price {} is not representable",
                    amount, self.unit_price
                ))
            })
    }

    /// Validate and apply sale parameters.
    ///
    /// Allowed from `Unconfigured` or re-entrant while `Open`; takes a fresh
    /// supply snapshot on every call. The floor must reconcile exactly with
    /// the seller balance minus the sale allocation.
    pub fn configure(
        &mut self,
        params: &ProtocolParams,
        seller_balance: Units,
        total_supply: Units,
        units_for_sale: Units,
        unit_price: Decimal,
        target_floor: Units,
    ) -> Result<()> {
        if self.phase == SalePhase::Ended {
            return Err(Error::SaleNotOpen);
        }
        if unit_price <= Decimal::ZERO {
            return Err(Error::InvalidPrice("unit price must be positive".to_string()));
        }

        let min = floor_units(total_supply, params.min_seller_floor_percent);
        let max = floor_units(total_supply, params.max_seller_floor_percent);
        if target_floor < min || target_floor > max {
            return Err(Error::FloorOutOfRange {
                floor: target_floor,
                min,
                max,
                supply: total_supply,
            });
        }

        // exact reconciliation, no rounding tolerance
        if seller_balance < units_for_sale || seller_balance - units_for_sale != target_floor {
            return Err(Error::FloorMismatch {
                balance: seller_balance,
                for_sale: units_for_sale,
                floor: target_floor,
            });
        }

        self.phase = SalePhase::Open;
        self.unit_price = unit_price;
        self.units_for_sale = units_for_sale;
        self.target_seller_floor = target_floor;
        self.supply_snapshot_at_sale_open = total_supply;
        Ok(())
    }

    /// Record the disclaimer flag for a holder; idempotent, never cleared
    pub fn acknowledge_disclaimer(&mut self, holder: &HolderId) {
        self.disclaimers.insert(holder.clone());
    }

    /// Validate a reservation request and record it.
    ///
    /// The caller escrows the payment before committing this bookkeeping.
    /// Reservations do not decrement `units_for_sale`; only purchases and
    /// early termination touch the counter.
    pub fn reserve(&mut self, holder: &HolderId, amount: Units, now: DateTime<Utc>) -> Result<()> {
        if self.phase != SalePhase::Open {
            return Err(Error::SaleNotOpen);
        }
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "reservation amount must be positive".to_string(),
            ));
        }
        if self.reservations.contains_key(holder) {
            return Err(Error::ReservationPending(holder.to_string()));
        }
        let available = self.unreserved_allocation();
        if amount > available {
            return Err(Error::AllocationExhausted {
                requested: amount,
                available,
            });
        }

        self.reservations.insert(
            holder.clone(),
            Reservation {
                amount,
                created_at: now,
            },
        );
        self.total_reserved += amount;
        Ok(())
    }

    /// Validate a purchase and update the sale totals.
    ///
    /// Returns the cost and whether a reservation was consumed; the caller
    /// pulls fresh payment only on the non-reservation path.
    pub fn purchase(&mut self, holder: &HolderId, amount: Units) -> Result<(Decimal, bool)> {
        if self.phase != SalePhase::Open {
            return Err(Error::SaleNotOpen);
        }
        if !self.disclaimer_acknowledged(holder) {
            return Err(Error::DisclaimerNotAcknowledged(holder.to_string()));
        }
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "purchase amount must be positive".to_string(),
            ));
        }

        let from_reservation = if let Some(reservation) = self.reservations.get(holder) {
            if reservation.amount != amount {
                return Err(Error::ReservationAmountMismatch {
                    reserved: reservation.amount,
                    requested: amount,
                });
            }
            true
        } else {
            let available = self.unreserved_allocation();
            if amount > available {
                return Err(Error::AllocationExhausted {
                    requested: amount,
                    available,
                });
            }
            false
        };

        let cost = self.cost_of(amount)?;
        let total_raised = self.total_raised.checked_add(cost).ok_or_else(|| {
            Error::InvariantViolation(format!("sale total overflows adding {}", cost))
        })?;

        if from_reservation {
            self.reservations.remove(holder);
            self.total_reserved -= amount;
        }
        self.units_for_sale -= amount;
        self.total_raised = total_raised;
        Ok((cost, from_reservation))
    }

    /// Validate an expiry refund and release the reservation.
    ///
    /// Requires the timeout to have elapsed and the disclaimer to still be
    /// unacknowledged. Returns the escrowed payment to release. Does NOT
    /// restore `units_for_sale`: reservations never decremented it.
    pub fn refund_expired(
        &mut self,
        params: &ProtocolParams,
        holder: &HolderId,
        now: DateTime<Utc>,
    ) -> Result<(Units, Decimal)> {
        let reservation = self
            .reservations
            .get(holder)
            .ok_or_else(|| Error::NoReservation(holder.to_string()))?;

        if self.disclaimer_acknowledged(holder) {
            return Err(Error::DisclaimerAcknowledged(holder.to_string()));
        }
        if now - reservation.created_at < params.reservation_timeout() {
            return Err(Error::ReservationNotExpired(holder.to_string()));
        }

        let amount = reservation.amount;
        let refund = self.cost_of(amount)?;
        self.reservations.remove(holder);
        self.total_reserved -= amount;
        Ok((amount, refund))
    }

    /// One-way `Open -> Ended`; zeroes the remaining allocation.
    /// Returns the unsold units wiped from the allocation.
    pub fn end_early(&mut self) -> Result<Units> {
        if self.phase != SalePhase::Open {
            return Err(Error::SaleNotOpen);
        }
        let unsold = self.units_for_sale;
        self.units_for_sale = 0;
        self.phase = SalePhase::Ended;
        Ok(unsold)
    }
}

impl Default for SaleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Floor band boundary in units: `supply * percent / 100`
fn floor_units(supply: Units, percent: u8) -> Units {
    (u128::from(supply) * u128::from(percent) / 100) as Units
}
