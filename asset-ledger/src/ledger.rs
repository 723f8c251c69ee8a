//! Ledger instance orchestration
//!
//! One `AssetLedger` holds everything a single fractional asset owns:
//! balance book, sale state, governance book, and the event log. Every
//! public operation follows the same discipline:
//!
//! 1. check the caller's role against the instance's identities,
//! 2. stage all mutations on a scratch copy of the state,
//! 3. validate every invariant on the staged copy,
//! 4. perform any payment-collaborator call,
//! 5. swap the staged copy in and append exactly one event.
//!
//! A failure at any step drops the scratch copy, so the committed state
//! never reflects a partial operation. Payment calls run after all local
//! validation: a guard failure never moves money within the failing call.

use crate::{
    balances::BalanceBook,
    clock::Clock,
    config::ProtocolParams,
    events::{EventKind, EventLog, LedgerEvent},
    governance::{GovernanceBook, Proposal},
    guard::{self, GuardContext},
    payment::PaymentLedger,
    sale::{SalePhase, SaleState},
    types::{HolderId, Units},
    Error, Result,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Mutable state of one ledger instance, cloned wholesale for staging
#[derive(Debug, Clone)]
pub struct LedgerState {
    /// Per-holder balances and total supply
    pub balances: BalanceBook,

    /// Sale parameters, reservations, disclaimers
    pub sale: SaleState,

    /// Proposals and votes
    pub governance: GovernanceBook,

    /// Current seller (mutable via `update_seller`)
    pub seller: HolderId,

    /// Global transfer switch
    pub transfers_enabled: bool,

    /// Circuit breaker: mutations fail while set
    pub paused: bool,
}

/// One asset's self-contained ledger instance
pub struct AssetLedger {
    asset_id: Uuid,
    name: String,
    symbol: String,
    operator: HolderId,
    registry_root: HolderId,
    third_party_beneficiary: HolderId,
    escrow_account: HolderId,
    params: ProtocolParams,
    clock: Arc<dyn Clock>,
    state: LedgerState,
    events: EventLog,
}

impl AssetLedger {
    /// Create a new, zero-supply ledger instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        asset_id: Uuid,
        name: impl Into<String>,
        symbol: impl Into<String>,
        seller: HolderId,
        operator: HolderId,
        registry_root: HolderId,
        third_party_beneficiary: HolderId,
        params: ProtocolParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if seller.is_null() {
            return Err(Error::InvalidRecipient("null seller".to_string()));
        }
        if operator.is_null() || registry_root.is_null() {
            return Err(Error::InvalidRecipient(
                "null operator or registry root".to_string(),
            ));
        }
        params.validate()?;

        let escrow_account = HolderId::new(format!("escrow:{}", asset_id));
        Ok(Self {
            asset_id,
            name: name.into(),
            symbol: symbol.into(),
            operator,
            registry_root,
            third_party_beneficiary,
            escrow_account,
            params,
            clock,
            state: LedgerState {
                balances: BalanceBook::new(),
                sale: SaleState::new(),
                governance: GovernanceBook::new(),
                seller,
                transfers_enabled: true,
                paused: false,
            },
            events: EventLog::new(),
        })
    }

    // ------------------------------------------------------------------
    // Reads

    /// Asset identifier
    pub fn asset_id(&self) -> Uuid {
        self.asset_id
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asset symbol
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current seller
    pub fn seller(&self) -> &HolderId {
        &self.state.seller
    }

    /// Third-party beneficiary of the fixed issuance allocation
    pub fn third_party_beneficiary(&self) -> &HolderId {
        &self.third_party_beneficiary
    }

    /// Escrow account holding reserved and purchased payment
    pub fn escrow_account(&self) -> &HolderId {
        &self.escrow_account
    }

    /// Balance of a holder
    pub fn balance_of(&self, holder: &HolderId) -> Units {
        self.state.balances.balance_of(holder)
    }

    /// Current total supply
    pub fn total_supply(&self) -> Units {
        self.state.balances.total_supply()
    }

    /// Sale state (read-only)
    pub fn sale(&self) -> &SaleState {
        &self.state.sale
    }

    /// Proposal by index
    pub fn proposal(&self, id: u64) -> Result<&Proposal> {
        self.state.governance.proposal(id)
    }

    /// Number of proposals ever created
    pub fn proposal_count(&self) -> usize {
        self.state.governance.len()
    }

    /// Global transfer switch
    pub fn transfers_enabled(&self) -> bool {
        self.state.transfers_enabled
    }

    /// Circuit breaker state
    pub fn paused(&self) -> bool {
        self.state.paused
    }

    /// Protocol parameters this instance was issued under
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Events appended since the last drain
    pub fn pending_events(&self) -> &[LedgerEvent] {
        self.events.pending()
    }

    /// Hand all pending events to an off-ledger observer
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Balance operations

    /// Mint new units to a holder (operator-only, issuance path).
    /// Mint bypasses the transfer guard.
    pub fn mint(&mut self, caller: &HolderId, to: &HolderId, amount: Units) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        staged.balances.mint(to, amount)?;

        self.commit(
            staged,
            EventKind::Minted {
                to: to.clone(),
                amount,
            },
        )
    }

    /// Ordinary holder-initiated transfer through the guard
    pub fn transfer(&mut self, caller: &HolderId, to: &HolderId, amount: Units) -> Result<()> {
        self.require_not_paused()?;
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "transfer amount must be positive".to_string(),
            ));
        }

        let mut staged = self.state.clone();
        Self::guarded_transfer(&mut staged, &self.params, caller, to, amount)?;

        self.commit(
            staged,
            EventKind::Transferred {
                from: caller.clone(),
                to: to.clone(),
                amount,
            },
        )
    }

    // ------------------------------------------------------------------
    // Sale operations

    /// Set or replace sale parameters (operator-only).
    ///
    /// Re-entrant while the sale is open; takes a fresh supply snapshot on
    /// every call. The seller balance minus the sale allocation must equal
    /// the floor exactly.
    pub fn configure_sale(
        &mut self,
        caller: &HolderId,
        units_for_sale: Units,
        unit_price: Decimal,
        target_floor: Units,
    ) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        let seller_balance = staged.balances.balance_of(&staged.seller);
        let total_supply = staged.balances.total_supply();
        staged.sale.configure(
            &self.params,
            seller_balance,
            total_supply,
            units_for_sale,
            unit_price,
            target_floor,
        )?;
        let snapshot = staged.sale.supply_snapshot_at_sale_open;

        tracing::info!(
            asset = %self.symbol,
            units_for_sale,
            %unit_price,
            target_floor,
            snapshot,
            "sale configured"
        );

        self.commit(
            staged,
            EventKind::SaleConfigured {
                units_for_sale,
                unit_price,
                target_seller_floor: target_floor,
                supply_snapshot: snapshot,
            },
        )
    }

    /// Record a holder's disclaimer acknowledgment (operator-forwarded).
    /// Idempotent: a repeat acknowledgment changes nothing and logs nothing.
    pub fn acknowledge_disclaimer(&mut self, caller: &HolderId, holder: &HolderId) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;
        if self.state.sale.disclaimer_acknowledged(holder) {
            return Ok(());
        }

        let mut staged = self.state.clone();
        staged.sale.acknowledge_disclaimer(holder);

        self.commit(
            staged,
            EventKind::DisclaimerAcknowledged {
                holder: holder.clone(),
            },
        )
    }

    /// Reserve sale units for a holder, escrowing `amount * price`
    pub fn reserve(
        &mut self,
        caller: &HolderId,
        holder: &HolderId,
        amount: Units,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        staged.sale.reserve(holder, amount, self.clock.now())?;
        let cost = staged.sale.cost_of(amount)?;

        // all validation passed; escrow the payment, then commit
        payment.transfer(holder, &self.escrow_account, cost)?;

        self.commit(
            staged,
            EventKind::Reserved {
                holder: holder.clone(),
                amount,
                cost,
            },
        )
    }

    /// Execute a purchase for a holder.
    ///
    /// With a live reservation the amount must match exactly and no new
    /// payment is taken; otherwise payment is pulled now. Both paths move
    /// units from the seller through the guard.
    ///
    /// Known gap, kept deliberately: if the guard rejects a purchase that
    /// follows an earlier committed `reserve`, the escrowed payment stays
    /// escrowed. Recovery is `refund_expired` after the timeout, which a
    /// later disclaimer acknowledgment blocks.
    pub fn purchase(
        &mut self,
        caller: &HolderId,
        holder: &HolderId,
        amount: Units,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        let (cost, from_reservation) = staged.sale.purchase(holder, amount)?;
        let seller = staged.seller.clone();
        Self::guarded_transfer(&mut staged, &self.params, &seller, holder, amount)?;

        if !from_reservation {
            payment.transfer(holder, &self.escrow_account, cost)?;
        }

        tracing::info!(
            asset = %self.symbol,
            %holder,
            amount,
            %cost,
            from_reservation,
            "purchase executed"
        );

        self.commit(
            staged,
            EventKind::Purchased {
                holder: holder.clone(),
                amount,
                cost,
                from_reservation,
            },
        )
    }

    /// Refund an expired, unacknowledged reservation (operator-only).
    /// Returns the escrowed payment; does not restore the sale allocation.
    pub fn refund_expired(
        &mut self,
        caller: &HolderId,
        holder: &HolderId,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        let (amount, refund) = staged
            .sale
            .refund_expired(&self.params, holder, self.clock.now())?;

        payment.transfer(&self.escrow_account, holder, refund)?;

        self.commit(
            staged,
            EventKind::ReservationRefunded {
                holder: holder.clone(),
                amount,
                refund,
            },
        )
    }

    /// End the sale early (operator-only, one-way); zeroes the allocation
    pub fn end_sale_early(&mut self, caller: &HolderId) -> Result<()> {
        self.require_operator(caller)?;
        self.require_not_paused()?;

        let mut staged = self.state.clone();
        let unsold_units = staged.sale.end_early()?;

        tracing::info!(asset = %self.symbol, unsold_units, "sale ended early");

        self.commit(staged, EventKind::SaleEnded { unsold_units })
    }

    /// Sweep the entire escrowed payment balance to the seller.
    /// Operator or registry root; requires the sale to have ended.
    /// An empty escrow makes this a no-op with no event.
    pub fn withdraw_payment(
        &mut self,
        caller: &HolderId,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_operator_or_root(caller)?;
        self.require_not_paused()?;
        if self.state.sale.phase != SalePhase::Ended {
            return Err(Error::SaleNotEnded);
        }

        let amount = payment.balance_of(&self.escrow_account);
        if amount == Decimal::ZERO {
            return Ok(());
        }

        let staged = self.state.clone();
        let seller = staged.seller.clone();
        payment.transfer(&self.escrow_account, &seller, amount)?;

        tracing::info!(asset = %self.symbol, %amount, %seller, "payment withdrawn");

        self.commit(staged, EventKind::PaymentWithdrawn { amount, seller })
    }

    // ------------------------------------------------------------------
    // Administration

    /// Reassign the seller identity (current seller or registry root).
    /// Moves no balances; the floor now protects the new seller's balance.
    pub fn update_seller(&mut self, caller: &HolderId, new_seller: &HolderId) -> Result<()> {
        if caller != &self.state.seller && caller != &self.registry_root {
            return Err(Error::Unauthorized(format!(
                "{} is neither seller nor registry root",
                caller
            )));
        }
        if new_seller.is_null() {
            return Err(Error::InvalidRecipient("null seller".to_string()));
        }

        let mut staged = self.state.clone();
        let old = std::mem::replace(&mut staged.seller, new_seller.clone());

        self.commit(
            staged,
            EventKind::SellerUpdated {
                old,
                new: new_seller.clone(),
            },
        )
    }

    /// Seize a holder's full balance to the registry root.
    ///
    /// A privileged operator transfer: it skips the paused gate but still
    /// runs through the guard.
    pub fn clawback(&mut self, caller: &HolderId, holder: &HolderId) -> Result<()> {
        self.require_operator_or_root(caller)?;

        let amount = self.state.balances.balance_of(holder);
        if amount == 0 {
            return Err(Error::NothingToClaw(holder.to_string()));
        }

        let mut staged = self.state.clone();
        let root = self.registry_root.clone();
        Self::guarded_transfer(&mut staged, &self.params, holder, &root, amount)?;

        tracing::warn!(asset = %self.symbol, %holder, amount, "balance clawed back");

        self.commit(
            staged,
            EventKind::ClawedBack {
                holder: holder.clone(),
                amount,
            },
        )
    }

    /// Toggle the global transfer switch (operator-only)
    pub fn set_transfers_enabled(&mut self, caller: &HolderId, enabled: bool) -> Result<()> {
        self.require_operator(caller)?;

        let mut staged = self.state.clone();
        staged.transfers_enabled = enabled;

        self.commit(staged, EventKind::TransfersToggled { enabled })
    }

    /// Toggle the circuit breaker (operator-only)
    pub fn set_paused(&mut self, caller: &HolderId, paused: bool) -> Result<()> {
        self.require_operator(caller)?;

        let mut staged = self.state.clone();
        staged.paused = paused;

        self.commit(staged, EventKind::PauseToggled { paused })
    }

    // ------------------------------------------------------------------
    // Governance

    /// Append a proposal (operator-only), returning its index
    pub fn create_proposal(
        &mut self,
        caller: &HolderId,
        description: impl Into<String>,
    ) -> Result<u64> {
        self.require_operator(caller)?;

        let description = description.into();
        let mut staged = self.state.clone();
        let id = staged.governance.create_proposal(description.clone());

        self.commit(
            staged,
            EventKind::ProposalCreated {
                proposal: id,
                description,
            },
        )?;
        Ok(id)
    }

    /// Cast a vote weighted by the holder's live balance
    pub fn vote(
        &mut self,
        caller: &HolderId,
        proposal_id: u64,
        holder: &HolderId,
        support: bool,
    ) -> Result<()> {
        self.require_operator(caller)?;

        let mut staged = self.state.clone();
        let weight = staged.balances.balance_of(holder);
        staged.governance.vote(proposal_id, holder, support, weight)?;

        self.commit(
            staged,
            EventKind::VoteCast {
                proposal: proposal_id,
                holder: holder.clone(),
                support,
                weight,
            },
        )
    }

    /// Finalize a proposal (operator-only, one-way); returns the outcome
    pub fn finalize_proposal(&mut self, caller: &HolderId, proposal_id: u64) -> Result<bool> {
        self.require_operator(caller)?;

        let mut staged = self.state.clone();
        let passed = staged.governance.finalize(proposal_id)?;

        self.commit(
            staged,
            EventKind::ProposalFinalized {
                proposal: proposal_id,
                passed,
            },
        )?;
        Ok(passed)
    }

    // ------------------------------------------------------------------
    // Internals

    /// Balance move with policy validation, applied to staged state only
    fn guarded_transfer(
        staged: &mut LedgerState,
        params: &ProtocolParams,
        from: &HolderId,
        to: &HolderId,
        amount: Units,
    ) -> Result<()> {
        let available = staged.balances.balance_of(from);
        if available < amount {
            return Err(Error::InsufficientBalance {
                holder: from.to_string(),
                available,
                requested: amount,
            });
        }

        let cap_supply = if staged.sale.has_snapshot() {
            staged.sale.supply_snapshot_at_sale_open
        } else {
            staged.balances.total_supply()
        };
        let ctx = GuardContext {
            transfers_enabled: staged.transfers_enabled,
            seller: &staged.seller,
            target_seller_floor: staged.sale.target_seller_floor,
            cap_supply,
            max_buyer_percent: params.max_buyer_percent,
        };
        guard::check_transfer(&ctx, &staged.balances, from, to, amount)?;

        staged.balances.transfer(from, to, amount)
    }

    /// Swap the staged state in after a final invariant sweep,
    /// then append the notification record
    fn commit(&mut self, staged: LedgerState, kind: EventKind) -> Result<()> {
        Self::check_invariants(&staged)?;
        self.state = staged;
        self.events.append(self.clock.now(), kind);
        tracing::debug!(
            asset = %self.symbol,
            seq = self.events.total_appended() - 1,
            "operation committed"
        );
        Ok(())
    }

    /// Standing invariants every committed state must satisfy.
    ///
    /// The seller floor is not re-checked here: the guard enforces it on
    /// every transfer path, and re-checking would block `update_seller`
    /// (a fresh seller address starts below the floor by construction).
    fn check_invariants(state: &LedgerState) -> Result<()> {
        state.balances.check_conservation()?;

        let sale = &state.sale;
        if sale.phase == SalePhase::Open && sale.total_reserved > sale.units_for_sale {
            return Err(Error::InvariantViolation(format!(
                "reserved {} exceeds allocation {}",
                sale.total_reserved, sale.units_for_sale
            )));
        }

        Ok(())
    }

    fn require_operator(&self, caller: &HolderId) -> Result<()> {
        if caller != &self.operator {
            return Err(Error::Unauthorized(format!("{} is not the operator", caller)));
        }
        Ok(())
    }

    fn require_operator_or_root(&self, caller: &HolderId) -> Result<()> {
        if caller != &self.operator && caller != &self.registry_root {
            return Err(Error::Unauthorized(format!(
                "{} is neither operator nor registry root",
                caller
            )));
        }
        Ok(())
    }

    fn require_not_paused(&self) -> Result<()> {
        if self.state.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }
}

impl std::fmt::Debug for AssetLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLedger")
            .field("asset_id", &self.asset_id)
            .field("symbol", &self.symbol)
            .field("total_supply", &self.state.balances.total_supply())
            .field("phase", &self.state.sale.phase)
            .finish()
    }
}
