//! Conversion between decimal currency amounts and processor minor units.
//!
//! The domain layer works in decimal major units (dollars). The processor
//! boundary works in integer minor units (cents). All conversions round
//! half away from zero so that 0.5 cents becomes 1 cent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{SettlementError, SettlementResult};

/// Number of decimal places carried by a major-unit amount
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Convert a major-unit amount to integer minor units.
///
/// `12.345` becomes `1235`, `-0.005` becomes `-1`.
pub fn to_minor_units(amount: Decimal) -> SettlementResult<i64> {
    let minor = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    minor
        .to_i64()
        .ok_or_else(|| SettlementError::amount_out_of_range(amount))
}

/// Convert integer minor units back to a major-unit amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}

/// Round a minor-unit denominated decimal to whole minor units.
///
/// Used for fee math where percentages produce fractional cents.
pub fn round_minor_units(minor: Decimal) -> SettlementResult<i64> {
    minor
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| SettlementError::amount_out_of_range(minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(20000, 2)).unwrap(), 20000);
        assert_eq!(to_minor_units(Decimal::new(1299, 2)).unwrap(), 1299);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 10.005 -> 1001, not 1000
        assert_eq!(to_minor_units(Decimal::new(10005, 3)).unwrap(), 1001);
        // -10.005 -> -1001
        assert_eq!(to_minor_units(Decimal::new(-10005, 3)).unwrap(), -1001);
        // 10.004 -> 1000
        assert_eq!(to_minor_units(Decimal::new(10004, 3)).unwrap(), 1000);
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(from_minor_units(7500), Decimal::new(75, 0));
        assert_eq!(from_minor_units(1), Decimal::new(1, 2));
        assert_eq!(from_minor_units(0), Decimal::ZERO);
    }

    #[test]
    fn test_round_trip() {
        let amount = Decimal::new(4937, 2);
        let minor = to_minor_units(amount).unwrap();
        assert_eq!(from_minor_units(minor), amount);
    }

    #[test]
    fn test_round_minor_units() {
        assert_eq!(round_minor_units(Decimal::new(12345, 1)).unwrap(), 1235);
        assert_eq!(round_minor_units(Decimal::new(12344, 1)).unwrap(), 1234);
    }
}
