//! Asset registry and access-control routing
//!
//! The registry exclusively owns the mapping from asset identifier to
//! ledger instance and seller. Every entry point resolves the target
//! instance, applies the role check for the calling identity, and forwards
//! the call acting as the instance's privileged operator. Failures abort
//! with no state change; the ledger's atomic commit guarantees that.

use crate::{types::AssetRecord, Error, Result};
use asset_ledger::{
    AssetLedger, Clock, HolderId, LedgerEvent, PaymentLedger, ProtocolParams, Units,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

struct AssetEntry {
    record: AssetRecord,
    ledger: AssetLedger,
}

/// Factory and administrative gateway for ledger instances
pub struct Registry {
    root: HolderId,
    operator: HolderId,
    third_party_beneficiary: HolderId,
    params: ProtocolParams,
    clock: Arc<dyn Clock>,
    assets: HashMap<Uuid, AssetEntry>,
}

impl Registry {
    /// Create a registry with fixed identities and protocol parameters
    pub fn new(
        root: HolderId,
        operator: HolderId,
        third_party_beneficiary: HolderId,
        params: ProtocolParams,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        params.validate().map_err(Error::Ledger)?;
        Ok(Self {
            root,
            operator,
            third_party_beneficiary,
            params,
            clock,
            assets: HashMap::new(),
        })
    }

    /// Registry root identity
    pub fn root(&self) -> &HolderId {
        &self.root
    }

    /// Operator identity the registry uses when forwarding
    pub fn operator(&self) -> &HolderId {
        &self.operator
    }

    /// Record for an asset
    pub fn record(&self, asset_id: Uuid) -> Result<&AssetRecord> {
        Ok(&self.entry(asset_id)?.record)
    }

    /// Ledger instance for an asset (read-only)
    pub fn ledger(&self, asset_id: Uuid) -> Result<&AssetLedger> {
        Ok(&self.entry(asset_id)?.ledger)
    }

    /// Number of issued assets
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    // ------------------------------------------------------------------
    // Issuance

    /// Issue a new asset: mint the fixed third-party allocation and the
    /// seller's share, then open the primary sale.
    ///
    /// Registry-root only. `target_floor` is in units and must land inside
    /// the configured percentage band of `supply`; the sale allocation is
    /// everything the seller holds above the floor.
    #[allow(clippy::too_many_arguments)]
    pub fn issue_asset(
        &mut self,
        caller: &HolderId,
        name: impl Into<String>,
        symbol: impl Into<String>,
        supply: Units,
        seller: HolderId,
        target_floor: Units,
        unit_price: Decimal,
    ) -> Result<Uuid> {
        self.require_root(caller)?;
        if seller.is_null() {
            return Err(Error::InvalidArgument("null seller".to_string()));
        }
        if supply == 0 {
            return Err(Error::InvalidArgument("zero supply".to_string()));
        }

        let name = name.into();
        let symbol = symbol.into();
        let asset_id = Uuid::now_v7();

        let mut ledger = AssetLedger::new(
            asset_id,
            name.clone(),
            symbol.clone(),
            seller.clone(),
            self.operator.clone(),
            self.root.clone(),
            self.third_party_beneficiary.clone(),
            self.params.clone(),
            self.clock.clone(),
        )?;

        let beneficiary_cut = (u128::from(supply)
            * u128::from(self.params.third_party_allocation_percent)
            / 100) as Units;
        let seller_units = supply - beneficiary_cut;
        let units_for_sale = seller_units.checked_sub(target_floor).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "floor {} exceeds seller share {}",
                target_floor, seller_units
            ))
        })?;

        if beneficiary_cut > 0 {
            ledger.mint(&self.operator, &self.third_party_beneficiary, beneficiary_cut)?;
        }
        ledger.mint(&self.operator, &seller, seller_units)?;
        ledger.configure_sale(&self.operator, units_for_sale, unit_price, target_floor)?;

        tracing::info!(
            %asset_id,
            %symbol,
            supply,
            %seller,
            units_for_sale,
            target_floor,
            "asset issued"
        );

        self.assets.insert(
            asset_id,
            AssetEntry {
                record: AssetRecord {
                    asset_id,
                    name,
                    symbol,
                    seller,
                },
                ledger,
            },
        );
        Ok(asset_id)
    }

    // ------------------------------------------------------------------
    // Administrative entry points (registry root)

    /// Set or replace sale parameters on an instance
    pub fn configure_sale(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        units_for_sale: Units,
        unit_price: Decimal,
        target_floor: Units,
    ) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.configure_sale(&operator, units_for_sale, unit_price, target_floor)?;
        Ok(())
    }

    /// Refund an expired, unacknowledged reservation
    pub fn refund_expired(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        holder: &HolderId,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.refund_expired(&operator, holder, payment)?;
        Ok(())
    }

    /// End the sale early, zeroing the remaining allocation
    pub fn end_sale_early(&mut self, caller: &HolderId, asset_id: Uuid) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.end_sale_early(&operator)?;
        Ok(())
    }

    /// Sweep the escrowed payment balance to the seller
    pub fn withdraw_payment(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.withdraw_payment(&operator, payment)?;
        Ok(())
    }

    /// Seize a holder's full balance to the registry root
    pub fn clawback(&mut self, caller: &HolderId, asset_id: Uuid, holder: &HolderId) -> Result<()> {
        self.require_root(caller)?;
        let root = self.root.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.clawback(&root, holder)?;
        Ok(())
    }

    /// Toggle the instance's global transfer switch
    pub fn set_transfers_enabled(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        enabled: bool,
    ) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.set_transfers_enabled(&operator, enabled)?;
        Ok(())
    }

    /// Toggle the instance's circuit breaker
    pub fn set_paused(&mut self, caller: &HolderId, asset_id: Uuid, paused: bool) -> Result<()> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.set_paused(&operator, paused)?;
        Ok(())
    }

    /// Reassign the seller (current seller or registry root)
    pub fn update_seller_address(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        new_seller: &HolderId,
    ) -> Result<()> {
        let entry = self
            .assets
            .get_mut(&asset_id)
            .ok_or(Error::AssetNotFound(asset_id))?;
        // role check happens in the instance against its seller and root
        entry.ledger.update_seller(caller, new_seller)?;
        entry.record.seller = new_seller.clone();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Holder entry points (any caller, acting on their own behalf)

    /// Record the caller's disclaimer acknowledgment
    pub fn acknowledge_disclaimer(&mut self, caller: &HolderId, asset_id: Uuid) -> Result<()> {
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.acknowledge_disclaimer(&operator, caller)?;
        Ok(())
    }

    /// Reserve sale units for the caller, escrowing payment
    pub fn reserve(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        amount: Units,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.reserve(&operator, caller, amount, payment)?;
        Ok(())
    }

    /// Execute a purchase for the caller
    pub fn purchase(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        amount: Units,
        payment: &mut dyn PaymentLedger,
    ) -> Result<()> {
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.purchase(&operator, caller, amount, payment)?;
        Ok(())
    }

    /// Ordinary transfer from the caller to another holder
    pub fn transfer(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        to: &HolderId,
        amount: Units,
    ) -> Result<()> {
        let ledger = self.ledger_mut(asset_id)?;
        ledger.transfer(caller, to, amount)?;
        Ok(())
    }

    /// Cast the caller's vote, weighted by their live balance
    pub fn vote(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        proposal_id: u64,
        support: bool,
    ) -> Result<()> {
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        ledger.vote(&operator, proposal_id, caller, support)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Governance administration (registry root)

    /// Append a proposal, returning its index
    pub fn create_proposal(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        description: impl Into<String>,
    ) -> Result<u64> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        Ok(ledger.create_proposal(&operator, description)?)
    }

    /// Finalize a proposal and return the outcome
    pub fn finalize_proposal(
        &mut self,
        caller: &HolderId,
        asset_id: Uuid,
        proposal_id: u64,
    ) -> Result<bool> {
        self.require_root(caller)?;
        let operator = self.operator.clone();
        let ledger = self.ledger_mut(asset_id)?;
        Ok(ledger.finalize_proposal(&operator, proposal_id)?)
    }

    // ------------------------------------------------------------------
    // Observation

    /// Hand an asset's pending notification records to an observer
    pub fn drain_events(&mut self, asset_id: Uuid) -> Result<Vec<LedgerEvent>> {
        let ledger = self.ledger_mut(asset_id)?;
        Ok(ledger.drain_events())
    }

    // ------------------------------------------------------------------
    // Internals

    fn entry(&self, asset_id: Uuid) -> Result<&AssetEntry> {
        self.assets
            .get(&asset_id)
            .ok_or(Error::AssetNotFound(asset_id))
    }

    fn ledger_mut(&mut self, asset_id: Uuid) -> Result<&mut AssetLedger> {
        self.assets
            .get_mut(&asset_id)
            .map(|entry| &mut entry.ledger)
            .ok_or(Error::AssetNotFound(asset_id))
    }

    fn require_root(&self, caller: &HolderId) -> Result<()> {
        if caller != &self.root {
            return Err(Error::Unauthorized(format!(
                "{} is not the registry root",
                caller
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("root", &self.root)
            .field("assets", &self.assets.len())
            .finish()
    }
}
