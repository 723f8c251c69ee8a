//! Protocol parameters for ledger instances

use serde::{Deserialize, Serialize};

/// Protocol parameters shared by every ledger instance a registry issues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolParams {
    /// Maximum percent of snapshotted supply any non-seller holder may hold
    pub max_buyer_percent: u8,

    /// Minimum seller floor, as percent of supply at sale configuration
    pub min_seller_floor_percent: u8,

    /// Maximum seller floor, as percent of supply at sale configuration
    pub max_seller_floor_percent: u8,

    /// Days before an unacknowledged reservation becomes refundable
    pub reservation_timeout_days: i64,

    /// Percent of issued supply minted to the third-party beneficiary
    pub third_party_allocation_percent: u8,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            max_buyer_percent: 15,
            min_seller_floor_percent: 10,
            max_seller_floor_percent: 30,
            reservation_timeout_days: 5,
            third_party_allocation_percent: 3,
        }
    }
}

impl ProtocolParams {
    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let params: ProtocolParams = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse params: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Load defaults, then apply environment variable overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut params = ProtocolParams::default();

        if let Ok(pct) = std::env::var("PLOTSHARE_MAX_BUYER_PERCENT") {
            params.max_buyer_percent = pct
                .parse()
                .map_err(|e| crate::Error::Config(format!("PLOTSHARE_MAX_BUYER_PERCENT: {}", e)))?;
        }

        if let Ok(days) = std::env::var("PLOTSHARE_RESERVATION_TIMEOUT_DAYS") {
            params.reservation_timeout_days = days.parse().map_err(|e| {
                crate::Error::Config(format!("PLOTSHARE_RESERVATION_TIMEOUT_DAYS: {}", e))
            })?;
        }

        params.validate()?;
        Ok(params)
    }

    /// Reject parameter sets that make the invariants unsatisfiable
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_buyer_percent == 0 || self.max_buyer_percent > 100 {
            return Err(crate::Error::Config(
                "max_buyer_percent must be in 1..=100".to_string(),
            ));
        }
        if self.min_seller_floor_percent > self.max_seller_floor_percent {
            return Err(crate::Error::Config(
                "min_seller_floor_percent exceeds max_seller_floor_percent".to_string(),
            ));
        }
        if self.max_seller_floor_percent > 100 {
            return Err(crate::Error::Config(
                "max_seller_floor_percent must be at most 100".to_string(),
            ));
        }
        if self.reservation_timeout_days <= 0 {
            return Err(crate::Error::Config(
                "reservation_timeout_days must be positive".to_string(),
            ));
        }
        if self.third_party_allocation_percent >= 100 {
            return Err(crate::Error::Config(
                "third_party_allocation_percent must be below 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Reservation timeout as a chrono duration
    pub fn reservation_timeout(&self) -> chrono::Duration {
        chrono::Duration::days(self.reservation_timeout_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ProtocolParams::default();
        assert_eq!(params.max_buyer_percent, 15);
        assert_eq!(params.min_seller_floor_percent, 10);
        assert_eq!(params.max_seller_floor_percent, 30);
        assert_eq!(params.reservation_timeout_days, 5);
        params.validate().unwrap();
    }

    #[test]
    fn test_invalid_floor_band() {
        let params = ProtocolParams {
            min_seller_floor_percent: 40,
            max_seller_floor_percent: 30,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let params = ProtocolParams::default();
        let toml_str = toml::to_string(&params).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        std::fs::write(&path, toml_str).unwrap();

        let loaded = ProtocolParams::from_file(&path).unwrap();
        assert_eq!(loaded, params);
    }
}
