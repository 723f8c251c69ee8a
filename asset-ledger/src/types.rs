//! Core types shared across the ledger modules
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (u64 for ownership units, Decimal for money)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Holder identifier (wallet address, account number, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct HolderId(String);

impl HolderId {
    /// Create new holder ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The null holder: rejected as a mint/transfer recipient
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount of ownership units (indivisible)
pub type Units = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_holder() {
        assert!(HolderId::new("").is_null());
        assert!(!HolderId::new("alice").is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(HolderId::new("alice").to_string(), "alice");
    }
}
