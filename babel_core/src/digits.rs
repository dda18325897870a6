//! Digit permutation applied between cipher rounds.

use crate::arith::{from_digits, to_digits};
use crate::error::ConfigError;
use num_bigint::BigUint;

/// Reference 80-position permutation, `P[i]` = destination of digit `i`.
pub const REFERENCE_PERMUTATION: [usize; 80] = [
    57, 23, 71, 4, 39, 66, 12, 50, 33, 78,
    8, 45, 19, 62, 0, 35, 53, 76, 27, 41,
    15, 69, 3, 58, 31, 74, 10, 47, 22, 64,
    6, 37, 55, 79, 17, 43, 26, 60, 1, 51,
    14, 72, 36, 48, 20, 65, 9, 38, 56, 75,
    29, 44, 18, 63, 2, 34, 52, 77, 24, 40,
    13, 68, 5, 59, 30, 73, 11, 46, 21, 61,
    7, 42, 54, 70, 16, 49, 28, 67, 32, 25,
];

/// A fixed bijection on digit positions together with its inverse.
///
/// Values are treated as exactly `width` digits in base `base`, most
/// significant first, so inputs in `[0, base^width)` map onto the same range.
#[derive(Debug, Clone)]
pub struct DigitPermutation {
    forward: Vec<usize>,
    inverse: Vec<usize>,
    base: u32,
}

impl DigitPermutation {
    /// Validates `table` as a bijection on `0..table.len()` and precomputes the inverse.
    pub fn new(table: &[usize], base: u32) -> Result<Self, ConfigError> {
        let width = table.len();
        let mut inverse = vec![usize::MAX; width];

        for (i, &p) in table.iter().enumerate() {
            if p >= width || inverse[p] != usize::MAX {
                return Err(ConfigError::PermutationNotBijective(p));
            }
            inverse[p] = i;
        }

        Ok(Self {
            forward: table.to_vec(),
            inverse,
            base,
        })
    }

    /// Number of digit positions.
    pub fn width(&self) -> usize {
        self.forward.len()
    }

    pub fn forward(&self) -> &[usize] {
        &self.forward
    }

    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// Exactly `width` digits of `num`, most significant first.
    pub fn to_digits(&self, num: &BigUint) -> Vec<u8> {
        to_digits(num, self.base, self.width())
    }

    pub fn from_digits(&self, digits: &[u8]) -> BigUint {
        from_digits(digits, self.base)
    }

    /// Moves digit `i` to position `P[i]`.
    pub fn shuffle(&self, num: &BigUint) -> BigUint {
        self.permute(num, &self.forward)
    }

    /// Moves digit `i` to position `P⁻¹[i]`, undoing [`shuffle`](Self::shuffle).
    pub fn unshuffle(&self, num: &BigUint) -> BigUint {
        self.permute(num, &self.inverse)
    }

    fn permute(&self, num: &BigUint, table: &[usize]) -> BigUint {
        let digits = self.to_digits(num);
        let mut out = vec![0u8; digits.len()];
        for (&digit, &dest) in digits.iter().zip(table) {
            out[dest] = digit;
        }
        self.from_digits(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DigitPermutation {
        DigitPermutation::new(&REFERENCE_PERMUTATION, 29).unwrap()
    }

    #[test]
    fn test_inverse_table() {
        let perm = reference();
        for i in 0..80 {
            assert_eq!(perm.forward()[perm.inverse()[i]], i);
            assert_eq!(perm.inverse()[perm.forward()[i]], i);
        }
    }

    #[test]
    fn test_rejects_non_bijection() {
        assert!(matches!(
            DigitPermutation::new(&[0, 1, 1], 29),
            Err(ConfigError::PermutationNotBijective(1))
        ));
        assert!(matches!(
            DigitPermutation::new(&[0, 3, 1], 29),
            Err(ConfigError::PermutationNotBijective(3))
        ));
    }

    #[test]
    fn test_shuffle_moves_digits() {
        let perm = reference();
        // Only the least significant digit (position 79) is set; P[79] = 25.
        let shuffled = perm.shuffle(&BigUint::from(5u32));
        let digits = perm.to_digits(&shuffled);
        assert_eq!(digits[25], 5);
        assert_eq!(digits.iter().filter(|&&d| d != 0).count(), 1);
    }

    #[test]
    fn test_shuffle_roundtrip() {
        let perm = reference();
        let n = BigUint::from(29u32).pow(80) - 1u32;
        assert_eq!(perm.unshuffle(&perm.shuffle(&n)), n);

        let n: BigUint = "123456789012345678901234567890123456789".parse().unwrap();
        assert_eq!(perm.unshuffle(&perm.shuffle(&n)), n);
        assert_eq!(perm.shuffle(&perm.unshuffle(&n)), n);
    }
}
