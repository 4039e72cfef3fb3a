use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{ArcadeError, Result};

pub const MICRO_ALGOS_PER_ALGO: u64 = 1_000_000;

pub fn micro_algos_to_algos(micro_algos: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(micro_algos), 6).normalize()
}

/// Rounds half away from zero to whole microAlgos.
pub fn algos_to_micro_algos(algos: Decimal) -> Result<u64> {
    if algos.is_sign_negative() && !algos.is_zero() {
        return Err(ArcadeError::Validation(format!("negative amount: {}", algos)));
    }

    algos
        .checked_mul(Decimal::from(MICRO_ALGOS_PER_ALGO))
        .map(|micro| micro.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|micro| micro.to_u64())
        .ok_or_else(|| ArcadeError::Validation(format!("amount out of range: {}", algos)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_micro_to_algos_is_exact() {
        assert_eq!(micro_algos_to_algos(1_500_000), Decimal::from_str("1.5").unwrap());
        assert_eq!(micro_algos_to_algos(1), Decimal::from_str("0.000001").unwrap());
        assert_eq!(micro_algos_to_algos(0), Decimal::ZERO);
    }

    #[test]
    fn test_algos_to_micro_rounds_half_away() {
        assert_eq!(algos_to_micro_algos(Decimal::from_str("2.5").unwrap()).unwrap(), 2_500_000);
        assert_eq!(algos_to_micro_algos(Decimal::from_str("0.0000005").unwrap()).unwrap(), 1);
        assert_eq!(algos_to_micro_algos(Decimal::from_str("0.0000004").unwrap()).unwrap(), 0);
        assert!(algos_to_micro_algos(Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn test_round_trip_through_micro() {
        for micro in [0u64, 1, 999_999, 1_000_000, 123_456_789_012] {
            assert_eq!(algos_to_micro_algos(micro_algos_to_algos(micro)).unwrap(), micro);
        }
    }
}
