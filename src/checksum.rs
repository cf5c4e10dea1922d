//! Weighted-digit checksum test.
//!
//! The digit at 1-indexed position `i`, counted from the least significant
//! end, is weighted by `i`. A number passes when the weighted sum is divisible
//! by the modulus.

use crate::error::{Result, SweepError};

/// A checksum divisor that is guaranteed to be nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modulus(i64);

impl Modulus {
    /// Validate a raw divisor.
    pub fn new(value: i64) -> Result<Self> {
        if value == 0 {
            return Err(SweepError::ZeroModulus);
        }
        Ok(Self(value))
    }

    /// The raw divisor.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Modulus {
    type Error = SweepError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

/// Sum of each decimal digit multiplied by its 1-indexed position.
///
/// Negative numbers use the digits of their absolute value. Zero is a single
/// digit 0 at position 1.
pub fn weighted_digit_sum(number: i64) -> u64 {
    let mut rest = number.unsigned_abs();
    let mut position = 1u64;
    let mut sum = 0u64;

    loop {
        sum += position * (rest % 10);
        rest /= 10;
        if rest == 0 {
            break;
        }
        position += 1;
    }

    sum
}

/// Whether `number` passes the checksum for `modulus`.
#[inline]
pub fn passes(number: i64, modulus: Modulus) -> bool {
    // A u64 sum of at most 20 digits weighted by at most 20 fits easily in i128.
    (weighted_digit_sum(number) as i128) % (modulus.get() as i128) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(value: i64) -> Modulus {
        Modulus::new(value).unwrap()
    }

    #[test]
    fn test_zero_modulus_rejected() {
        assert_eq!(Modulus::new(0), Err(SweepError::ZeroModulus));
        assert_eq!(Modulus::try_from(0), Err(SweepError::ZeroModulus));
    }

    #[test]
    fn test_weighted_sum_by_hand() {
        assert_eq!(weighted_digit_sum(0), 0);
        assert_eq!(weighted_digit_sum(7), 7);
        // 8*1 + 1*2
        assert_eq!(weighted_digit_sum(18), 10);
        // 3*1 + 2*2 + 1*3
        assert_eq!(weighted_digit_sum(123), 10);
        // 0*1 + 0*2 + 1*3
        assert_eq!(weighted_digit_sum(100), 3);
        assert_eq!(weighted_digit_sum(-123), 10);
    }

    #[test]
    fn test_zero_passes_any_modulus() {
        for modulus in [1, 2, 7, 11, -3, 1_000_000] {
            assert!(passes(0, m(modulus)));
        }
    }

    #[test]
    fn test_small_range_example() {
        let passing: Vec<i64> = (0..20).filter(|&n| passes(n, m(10))).collect();
        assert_eq!(passing, vec![0, 18]);
    }

    #[test]
    fn test_deterministic() {
        let modulus = m(11);
        for n in [0, 1, 19, 274_856_123, i64::MAX, i64::MIN] {
            assert_eq!(passes(n, modulus), passes(n, modulus));
        }
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert!(weighted_digit_sum(i64::MIN) > 0);
        assert!(weighted_digit_sum(i64::MAX) > 0);
        assert!(passes(i64::MIN, m(1)));
        assert!(!passes(1, m(i64::MIN)));
    }

    #[test]
    fn test_negative_modulus_matches_positive() {
        for n in 0..500 {
            assert_eq!(passes(n, m(11)), passes(n, m(-11)));
        }
    }
}
