//! Error types for the registry

use thiserror::Error;
use uuid::Uuid;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Registry errors
#[derive(Error, Debug)]
pub enum Error {
    /// No record for the asset identifier
    #[error("Asset not found: {0}")]
    AssetNotFound(Uuid),

    /// Caller lacks the role required for this entry point
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid issuance argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure surfaced verbatim from the ledger instance
    #[error("Ledger error: {0}")]
    Ledger(#[from] asset_ledger::Error),
}
