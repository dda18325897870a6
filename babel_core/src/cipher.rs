//! The round cipher: keyed affine steps interleaved with digit permutations.
//!
//! ```text
//! address ─► [a₀x+b₀ mod N] ─► shuffle ─► ... ─► [a₃x+b₃ mod N] ─► shuffle ─► content
//! content ─► unshuffle ─► [a₃⁻¹(x−b₃) mod N] ─► ... ─► unshuffle ─► [a₀⁻¹(x−b₀) mod N] ─► address
//! ```
//!
//! This is a deterministic bijection for content generation. It offers no
//! secrecy and makes no constant-time promises.

use crate::arith::mod_inverse;
use crate::digits::DigitPermutation;
use crate::error::ArithmeticError;
use num_bigint::BigUint;

/// Number of rounds in the reference cipher.
pub const ROUND_COUNT: usize = 4;

/// Reference round keys as decimal `(multiplier, increment)` pairs.
///
/// Drawn from the digits of the Euler–Mascheroni, Catalan, Apéry and
/// Khinchin constants.
pub const REFERENCE_ROUND_KEYS: [(&str, &str); ROUND_COUNT] = [
    (
        "577215664901532860606512090082402431042",
        "362436069362436069362436069362436069362",
    ),
    (
        "915965594177219015054603514932384110774",
        "521288135003931818257312212568940493854",
    ),
    (
        "120205690315959428539973816151144999076",
        "694157382953428756017412963592033481532",
    ),
    (
        "268545200106530644530971483548179569383",
        "847203734825117396803953917486355627082",
    ),
];

/// One affine round `x ↦ a·x + b (mod N)` with its precomputed inverse.
#[derive(Debug, Clone)]
pub struct RoundKey {
    multiplier: BigUint,
    increment: BigUint,
    inverse: BigUint,
}

impl RoundKey {
    /// Reduces both components modulo `modulus` and inverts the multiplier.
    pub fn new(
        multiplier: &BigUint,
        increment: &BigUint,
        modulus: &BigUint,
    ) -> Result<Self, ArithmeticError> {
        let multiplier = multiplier % modulus;
        let increment = increment % modulus;
        let inverse = mod_inverse(&multiplier, modulus)?;

        Ok(Self {
            multiplier,
            increment,
            inverse,
        })
    }

    pub fn multiplier(&self) -> &BigUint {
        &self.multiplier
    }

    pub fn increment(&self) -> &BigUint {
        &self.increment
    }

    /// `a⁻¹ mod N`.
    pub fn inverse(&self) -> &BigUint {
        &self.inverse
    }

    fn forward(&self, x: &BigUint, modulus: &BigUint) -> BigUint {
        (&self.multiplier * x + &self.increment) % modulus
    }

    /// `x` must already be reduced below `modulus`.
    fn backward(&self, x: &BigUint, modulus: &BigUint) -> BigUint {
        let shifted = if *x >= self.increment {
            x - &self.increment
        } else {
            x + modulus - &self.increment
        };
        (&self.inverse * shifted) % modulus
    }
}

/// Four-round cipher over `[0, N)` where `N = base^width` of the permutation.
#[derive(Debug, Clone)]
pub struct RoundCipher {
    modulus: BigUint,
    rounds: Vec<RoundKey>,
    permutation: DigitPermutation,
}

impl RoundCipher {
    /// Assembles a cipher from already-validated parts.
    ///
    /// `modulus` must equal `base^width` of `permutation`, and every key must
    /// have been built against the same modulus.
    pub fn new(modulus: BigUint, rounds: Vec<RoundKey>, permutation: DigitPermutation) -> Self {
        Self {
            modulus,
            rounds,
            permutation,
        }
    }

    /// Size of the address space, `N`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn rounds(&self) -> &[RoundKey] {
        &self.rounds
    }

    pub fn permutation(&self) -> &DigitPermutation {
        &self.permutation
    }

    /// Maps an address to its content number. Inputs are reduced mod `N` first.
    pub fn encrypt(&self, address: &BigUint) -> BigUint {
        let mut x = address % &self.modulus;
        for key in &self.rounds {
            x = key.forward(&x, &self.modulus);
            x = self.permutation.shuffle(&x);
        }
        x
    }

    /// Maps a content number back to its address. Exact inverse of [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, content: &BigUint) -> BigUint {
        let mut x = content % &self.modulus;
        for key in self.rounds.iter().rev() {
            x = self.permutation.unshuffle(&x);
            x = key.backward(&x, &self.modulus);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digits::REFERENCE_PERMUTATION;
    use num_traits::{One, Zero};

    fn modulus() -> BigUint {
        BigUint::from(29u32).pow(80)
    }

    fn reference() -> RoundCipher {
        let n = modulus();
        let rounds = REFERENCE_ROUND_KEYS
            .iter()
            .map(|(a, b)| {
                RoundKey::new(&a.parse::<BigUint>().unwrap(), &b.parse::<BigUint>().unwrap(), &n)
                    .unwrap()
            })
            .collect();
        let perm = DigitPermutation::new(&REFERENCE_PERMUTATION, 29).unwrap();
        RoundCipher::new(n, rounds, perm)
    }

    #[test]
    fn test_round_key_inverse() {
        let cipher = reference();
        for key in cipher.rounds() {
            assert_eq!((key.multiplier() * key.inverse()) % cipher.modulus(), BigUint::one());
        }
    }

    #[test]
    fn test_non_invertible_multiplier() {
        let n = modulus();
        let err = RoundKey::new(&BigUint::from(58u32), &BigUint::one(), &n).unwrap_err();
        assert!(matches!(err, ArithmeticError::NotInvertible { .. }));
    }

    #[test]
    fn test_encrypt_zero_golden() {
        let expected: BigUint = "211653502807301050253822313329907129689528942948102436513313867637306358822167284761883231522110614438142070414055181"
            .parse()
            .unwrap();
        assert_eq!(reference().encrypt(&BigUint::zero()), expected);
    }

    #[test]
    fn test_roundtrip_edges() {
        let cipher = reference();
        let n = modulus();
        let samples = [
            BigUint::zero(),
            BigUint::one(),
            BigUint::from(42u32),
            BigUint::from(314_159_265u32),
            BigUint::from(29u32).pow(40),
            &n - 1u32,
        ];
        for a in samples {
            let c = cipher.encrypt(&a);
            assert!(c < n);
            assert_eq!(cipher.decrypt(&c), a);
        }
    }

    #[test]
    fn test_adjacent_addresses_distinct() {
        let cipher = reference();
        let mut seen = std::collections::HashSet::new();
        for i in 0u32..100 {
            assert!(seen.insert(cipher.encrypt(&BigUint::from(i))), "collision at {}", i);
        }
    }

    #[test]
    fn test_inputs_reduced() {
        let cipher = reference();
        let n = modulus();
        assert_eq!(cipher.encrypt(&(&n + 7u32)), cipher.encrypt(&BigUint::from(7u32)));
    }
}
