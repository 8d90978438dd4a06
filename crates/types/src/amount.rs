//! Token amounts held by the ledger and the escrow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of the ledger's base unit.
///
/// All escrow arithmetic is exact integer arithmetic; fees charged by the
/// transport carrying a submission are never deducted here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Amount(0);

    /// Get the raw value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Half of this amount, rounded down.
    pub fn half(self) -> Self {
        Amount(self.0 / 2)
    }

    /// Whether this amount splits into two equal halves.
    pub fn is_even(&self) -> bool {
        self.0 % 2 == 0
    }

    /// Add, returning None on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Self> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Subtract, returning None on underflow.
    pub fn checked_sub(self, other: Amount) -> Option<Self> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_and_parity() {
        let pot = Amount(10_000_000_000);
        assert!(pot.is_even());
        assert_eq!(pot.half(), Amount(5_000_000_000));
        assert!(!Amount(7).is_even());
        assert_eq!(Amount(7).half(), Amount(3));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(Amount(5).checked_add(Amount(6)), Some(Amount(11)));
        assert_eq!(Amount(u64::MAX).checked_add(Amount(1)), None);
        assert_eq!(Amount(5).checked_sub(Amount(6)), None);
        assert_eq!(Amount(6).checked_sub(Amount(6)), Some(Amount::ZERO));
    }
}
