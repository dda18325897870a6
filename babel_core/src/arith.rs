//! Arbitrary-precision helpers: non-negative reduction, extended GCD,
//! modular inverse, and positional digit conversion.

use crate::error::ArithmeticError;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Returns the representative of `a` in `[0, m)`.
///
/// Unlike `%` on signed values, a negative `a` maps to a non-negative result.
///
/// # Panics
/// Panics if `m` is zero.
pub fn modulo(a: &BigInt, m: &BigUint) -> BigUint {
    let r = a.magnitude() % m;
    if a.sign() == Sign::Minus && !r.is_zero() {
        m - r
    } else {
        r
    }
}

/// Extended Euclid: returns `(g, x, y)` with `g = gcd(a, b) = a*x + b*y`.
/// Iterative.
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let (q, next_r) = old_r.div_rem(&r);
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Returns `x` in `[0, m)` with `a*x ≡ 1 (mod m)`.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint, ArithmeticError> {
    if m.is_zero() {
        return Err(ArithmeticError::ZeroModulus);
    }

    let (g, x, _) = extended_gcd(&BigInt::from(a.clone()), &BigInt::from(m.clone()));
    if !g.is_one() {
        return Err(ArithmeticError::NotInvertible {
            value: a.to_string(),
            modulus: m.to_string(),
        });
    }

    Ok(modulo(&x, m))
}

/// Splits `num` into exactly `width` base-`base` digits, most significant first.
///
/// Digits above position `width` are dropped, so the result encodes
/// `num mod base^width`. `base` must lie in `2..=256`.
pub fn to_digits(num: &BigUint, base: u32, width: usize) -> Vec<u8> {
    let mut digits = num.to_radix_le(base);
    digits.resize(width, 0);
    digits.reverse();
    digits
}

/// Folds base-`base` digits, most significant first, into an integer.
pub fn from_digits(digits: &[u8], base: u32) -> BigUint {
    digits
        .iter()
        .fold(BigUint::zero(), |acc, &d| acc * base + u32::from(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_modulo_negative() {
        let m = BigUint::from(7u32);
        assert_eq!(modulo(&big(-1), &m), BigUint::from(6u32));
        assert_eq!(modulo(&big(-14), &m), BigUint::zero());
        assert_eq!(modulo(&big(-15), &m), BigUint::from(6u32));
    }

    #[test]
    fn test_modulo_positive() {
        let m = BigUint::from(7u32);
        assert_eq!(modulo(&big(0), &m), BigUint::zero());
        assert_eq!(modulo(&big(20), &m), BigUint::from(6u32));
    }

    #[test]
    fn test_extended_gcd_identity() {
        let cases = [(240, 46), (46, 240), (17, 5), (0, 9), (9, 0), (29, 29)];
        for (a, b) in cases {
            let (g, x, y) = extended_gcd(&big(a), &big(b));
            assert_eq!(&big(a) * &x + &big(b) * &y, g, "bezout for ({}, {})", a, b);
        }
        assert_eq!(extended_gcd(&big(240), &big(46)).0, big(2));
    }

    #[test]
    fn test_extended_gcd_large_operands() {
        let n = BigInt::from(29u32).pow(80u32);
        let a: BigInt = "577215664901532860606512090082402431042".parse().unwrap();
        let (g, x, y) = extended_gcd(&a, &n);
        assert!(g.is_one());
        assert_eq!(&a * &x + &n * &y, g);
    }

    #[test]
    fn test_mod_inverse() {
        let m = BigUint::from(29u32);
        for a in 1u32..29 {
            let inv = mod_inverse(&BigUint::from(a), &m).unwrap();
            assert_eq!((BigUint::from(a) * inv) % &m, BigUint::one());
        }
    }

    #[test]
    fn test_mod_inverse_missing() {
        let err = mod_inverse(&BigUint::from(58u32), &BigUint::from(29u32).pow(3)).unwrap_err();
        assert!(matches!(err, ArithmeticError::NotInvertible { .. }));

        let err = mod_inverse(&BigUint::from(3u32), &BigUint::zero()).unwrap_err();
        assert_eq!(err, ArithmeticError::ZeroModulus);
    }

    #[test]
    fn test_digit_conversion() {
        let n = BigUint::from(29u32 * 29 * 5 + 29 * 3 + 7);
        assert_eq!(to_digits(&n, 29, 4), vec![0, 5, 3, 7]);
        assert_eq!(from_digits(&[0, 5, 3, 7], 29), n);
        assert_eq!(to_digits(&BigUint::zero(), 29, 3), vec![0, 0, 0]);
    }
}
