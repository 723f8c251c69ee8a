//! PlotShare Registry
//!
//! Factory and administrative gateway for fractional-asset ledger
//! instances. The registry exclusively owns the asset-id to ledger mapping,
//! applies the role check for every entry point (registry root for
//! administration, seller-or-root for seller changes, any caller acting on
//! their own behalf for sale and governance participation), and forwards
//! calls as each instance's privileged operator.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod registry;
pub mod types;

// Re-exports
pub use error::{Error, Result};
pub use registry::Registry;
pub use types::AssetRecord;
