//! Arbitrary-precision integer helpers shared by the binomial kernel,
//! encoder, and decoder.
//!
//! This crate builds on `num-bigint`'s `BigUint` rather than a hand-rolled
//! backend; the corpus reaches for `num-bigint`/`num-integer`/`num-traits`
//! whenever arbitrary-precision arithmetic is needed, and there is no
//! reason for this codec to be the exception.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Divide `numerator` by `divisor`, asserting the division is exact.
///
/// The binomial kernel only ever divides a product of consecutive
/// integers by a factorial that is guaranteed to divide it, so this is a
/// true exact division rather than a general one. Debug builds verify the
/// remainder is zero; release builds skip the check and just perform the
/// division, since `BigUint`'s `/` computes the same quotient either way.
pub fn div_exact(numerator: &BigUint, divisor: &BigUint) -> BigUint {
    debug_assert!(
        (numerator % divisor).is_zero(),
        "div_exact called with a non-exact divisor"
    );
    numerator / divisor
}

/// `n!` as a `BigUint`.
pub fn factorial(n: u64) -> BigUint {
    let mut acc = BigUint::one();
    for i in 2..=n {
        acc *= i;
    }
    acc
}

/// Floor of the integer `n`-th root of `value`.
///
/// `num-bigint` does not ship an integer root primitive usable without
/// pulling in extra feature flags, so this is a direct Newton's-method
/// implementation, as suggested by the design notes: start from an
/// overestimate derived from the bit length and iterate
/// `x' = ((n-1)*x + value/x^(n-1)) / n` until it stops decreasing.
pub fn nth_root(value: &BigUint, n: u64) -> BigUint {
    if value.is_zero() {
        return BigUint::zero();
    }
    if n == 1 {
        return value.clone();
    }

    let bits = value.bits();
    let mut x = BigUint::one() << (bits / n + 1);

    loop {
        let x_pow = x.pow((n - 1) as u32);
        let next = (&x * (n - 1) + value / x_pow) / n;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Export `value` as a little-endian, unpadded byte string; zero is a
/// single `0x00` byte (matches `mpz_export`'s behaviour, which writes
/// nothing for zero and must be special-cased by the caller).
pub fn export_le(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return vec![0];
    }
    value.to_bytes_le()
}

/// Import a little-endian byte string as a `BigUint`.
pub fn import_le(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_le(bytes)
}

/// Bit length of `value` (`0` has bit length `0`).
pub fn bit_length(value: &BigUint) -> u64 {
    value.bits()
}
