//! Registry record types

use asset_ledger::HolderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-asset record held by the registry.
///
/// The ledger handle is the registry's map entry keyed by `asset_id` and is
/// immutable once set; `seller` tracks the instance's current seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Asset identifier
    pub asset_id: Uuid,

    /// Asset name
    pub name: String,

    /// Asset symbol
    pub symbol: String,

    /// Current seller (kept in sync with the ledger instance)
    pub seller: HolderId,
}
