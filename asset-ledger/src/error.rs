//! Error types for the asset ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure taxonomy surfaced to callers alongside the concrete error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong caller role
    Authorization,
    /// Zero/out-of-range amount, address, or price
    InvalidArgument,
    /// Seller floor, buyer cap, supply/reservation mismatch
    InvariantViolation,
    /// Wrong phase, already finalized/voted, reservation collision
    StateError,
    /// Escrow pull/push failure from the payment collaborator
    Payment,
}

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Caller lacks the role required for this operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Mint or transfer to the null holder
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Zero or out-of-range amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Zero or out-of-range unit price
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Sender balance below requested amount
    #[error("Insufficient balance: holder {holder} has {available}, needs {requested}")]
    InsufficientBalance {
        /// Sending holder
        holder: String,
        /// Current balance
        available: u64,
        /// Requested transfer amount
        requested: u64,
    },

    /// Global transfer switch is off
    #[error("Transfers are disabled")]
    TransfersDisabled,

    /// Transfer would take the seller below the protected floor
    #[error("Seller floor violation: balance {balance} - {amount} < floor {floor}")]
    SellerFloorViolation {
        /// Seller balance before the transfer
        balance: u64,
        /// Attempted transfer amount
        amount: u64,
        /// Protected floor
        floor: u64,
    },

    /// Transfer would push a holder over the concentration cap
    #[error("Buyer cap exceeded: {holder} would hold {would_hold}, cap is {cap}")]
    BuyerCapExceeded {
        /// Receiving holder
        holder: String,
        /// Balance after the transfer
        would_hold: u64,
        /// Maximum allowed balance
        cap: u64,
    },

    /// Target floor outside the allowed percentage band of supply
    #[error("Seller floor {floor} outside [{min}, {max}] of supply {supply}")]
    FloorOutOfRange {
        /// Requested floor in units
        floor: u64,
        /// Minimum allowed floor in units
        min: u64,
        /// Maximum allowed floor in units
        max: u64,
        /// Supply at configure time
        supply: u64,
    },

    /// Seller balance minus sale allocation does not reconcile with the floor
    #[error("Floor mismatch: seller balance {balance} - for-sale {for_sale} != floor {floor}")]
    FloorMismatch {
        /// Seller balance at configure time
        balance: u64,
        /// Requested sale allocation
        for_sale: u64,
        /// Requested floor
        floor: u64,
    },

    /// Requested amount exceeds the unreserved sale allocation
    #[error("Allocation exhausted: requested {requested}, available {available}")]
    AllocationExhausted {
        /// Requested units
        requested: u64,
        /// Unreserved units remaining
        available: u64,
    },

    /// Operation requires an open sale
    #[error("Sale is not open")]
    SaleNotOpen,

    /// Operation requires the sale to have ended
    #[error("Sale has not ended")]
    SaleNotEnded,

    /// Ledger is paused
    #[error("Ledger is paused")]
    Paused,

    /// Holder already has a live reservation
    #[error("Reservation already pending for {0}")]
    ReservationPending(String),

    /// No live reservation for the holder
    #[error("No reservation for {0}")]
    NoReservation(String),

    /// Reservation timeout has not elapsed yet
    #[error("Reservation for {0} has not expired")]
    ReservationNotExpired(String),

    /// Purchase amount must match the reserved amount exactly
    #[error("Reservation amount mismatch: reserved {reserved}, requested {requested}")]
    ReservationAmountMismatch {
        /// Reserved units
        reserved: u64,
        /// Requested purchase units
        requested: u64,
    },

    /// Purchase requires a prior disclaimer acknowledgment
    #[error("Disclaimer not acknowledged by {0}")]
    DisclaimerNotAcknowledged(String),

    /// Refund blocked because the holder acknowledged the disclaimer
    #[error("Disclaimer already acknowledged by {0}")]
    DisclaimerAcknowledged(String),

    /// Proposal already finalized
    #[error("Proposal {0} already finalized")]
    AlreadyFinalized(u64),

    /// Holder already voted on this proposal
    #[error("Holder {holder} already voted on proposal {proposal}")]
    AlreadyVoted {
        /// Voting holder
        holder: String,
        /// Proposal index
        proposal: u64,
    },

    /// Voter holds no units
    #[error("No voting power: {0} holds zero units")]
    NoVotingPower(String),

    /// Proposal index out of range
    #[error("Proposal {0} not found")]
    ProposalNotFound(u64),

    /// Clawback target holds nothing
    #[error("Nothing to claw from {0}")]
    NothingToClaw(String),

    /// Post-commit invariant check failed (supply conservation, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Payment collaborator failure
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map the concrete error onto the coarse taxonomy
    pub fn category(&self) -> ErrorCategory {
        use Error::*;
        match self {
            Unauthorized(_) => ErrorCategory::Authorization,
            InvalidRecipient(_) | InvalidAmount(_) | InvalidPrice(_) | NoVotingPower(_)
            | Config(_) | Serialization(_) | Io(_) => ErrorCategory::InvalidArgument,
            InsufficientBalance { .. }
            | SellerFloorViolation { .. }
            | BuyerCapExceeded { .. }
            | FloorOutOfRange { .. }
            | FloorMismatch { .. }
            | AllocationExhausted { .. }
            | NothingToClaw(_)
            | InvariantViolation(_) => ErrorCategory::InvariantViolation,
            TransfersDisabled
            | SaleNotOpen
            | SaleNotEnded
            | Paused
            | ReservationPending(_)
            | NoReservation(_)
            | ReservationNotExpired(_)
            | ReservationAmountMismatch { .. }
            | DisclaimerNotAcknowledged(_)
            | DisclaimerAcknowledged(_)
            | AlreadyFinalized(_)
            | AlreadyVoted { .. }
            | ProposalNotFound(_) => ErrorCategory::StateError,
            Payment(_) => ErrorCategory::Payment,
        }
    }
}

/// Failure reported by the external payment-asset collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("payment transfer failed: {0}")]
pub struct PaymentError(pub String);
