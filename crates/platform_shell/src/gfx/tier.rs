//! Negotiated capability tiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// The maximum feature set negotiated between requested and device-supported
/// graphics capability.
///
/// `Unknown` is double-duty, matching the original wire values: as a request
/// it means "unspecified, negotiate the highest supported tier"; as a result
/// it means the device reported a feature level with no mapping here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum CapabilityTier {
    /// Unspecified request / unmappable result
    #[default]
    Unknown,
    /// Feature tier 10.0
    Tier10_0,
    /// Feature tier 10.1
    Tier10_1,
    /// Feature tier 11.0
    Tier11_0,
    /// Feature tier 11.1
    Tier11_1,
}

impl CapabilityTier {
    /// Descending fallback candidates tried when no tier is requested
    pub const FALLBACK: [Self; 3] = [Self::Tier11_0, Self::Tier10_1, Self::Tier10_0];

    /// Whether this value stands for "no specific tier requested"
    pub fn is_unspecified(self) -> bool {
        self == Self::Unknown
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Tier10_0 => "10.0",
            Self::Tier10_1 => "10.1",
            Self::Tier11_0 => "11.0",
            Self::Tier11_1 => "11.1",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_by_capability() {
        assert!(CapabilityTier::Tier11_1 > CapabilityTier::Tier11_0);
        assert!(CapabilityTier::Tier11_0 > CapabilityTier::Tier10_1);
        assert!(CapabilityTier::Tier10_1 > CapabilityTier::Tier10_0);
        assert!(CapabilityTier::Tier10_0 > CapabilityTier::Unknown);
    }

    #[test]
    fn fallback_candidates_descend() {
        let mut sorted = CapabilityTier::FALLBACK.to_vec();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, CapabilityTier::FALLBACK.to_vec());
    }
}
