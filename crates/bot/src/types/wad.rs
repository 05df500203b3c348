//! Conversion helpers for on-chain fixed-point values.
//!
//! Amounts and balances arrive as WAD-scaled (18 decimals) `U256`; gas
//! prices arrive as wei. Everything downstream works in `Decimal`.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use std::str::FromStr;

const WAD_SCALE: Decimal = dec!(1_000_000_000_000_000_000);
const GWEI_SCALE: Decimal = dec!(1_000_000_000);

/// WAD-scaled value (18 decimals). Used for balances and token amounts.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Wad(pub U256);

impl Wad {
    pub const ZERO: Wad = Wad(U256::ZERO);

    /// Convert on-chain WAD (U256) to off-chain `Decimal`.
    pub fn to_decimal(self) -> Decimal {
        let raw = Decimal::from_str(&self.0.to_string()).unwrap_or_default();
        raw / WAD_SCALE
    }

    /// Create from a `U256` that is already WAD-scaled.
    pub fn from_raw(val: U256) -> Self {
        Self(val)
    }
}

impl fmt::Debug for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wad({})", self.to_decimal())
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl From<U256> for Wad {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

/// Convert a raw U256 WAD value to `Decimal`. Convenience alias for `Wad::to_decimal`.
pub fn wad_to_decimal(wad: U256) -> Decimal {
    Wad(wad).to_decimal()
}

/// Convert a wei gas price to gwei.
pub fn wei_to_gwei(wei: u128) -> Decimal {
    Decimal::from(wei) / GWEI_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wad_one_ether() {
        let one = Wad::from_raw(U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(one.to_decimal(), dec!(1));
    }

    #[test]
    fn test_wad_zero() {
        assert_eq!(Wad::ZERO.to_decimal(), dec!(0));
    }

    #[test]
    fn test_wad_fractional_balance() {
        // 2.5 ETH in wei.
        let val = U256::from(2_500_000_000_000_000_000u128);
        assert_eq!(wad_to_decimal(val), dec!(2.5));
    }

    #[test]
    fn test_wei_to_gwei() {
        // 30 gwei gas price.
        assert_eq!(wei_to_gwei(30_000_000_000), dec!(30));
    }

    #[test]
    fn test_wei_to_gwei_sub_gwei() {
        assert_eq!(wei_to_gwei(500_000_000), dec!(0.5));
    }
}
