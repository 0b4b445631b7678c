//! Binomial kernel: `C(n, k)` and the two incremental operations the
//! encoder/decoder build their codes from.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use crate::bigint::div_exact;
use num_bigint::BigUint;
use num_traits::Zero;

/// Product of the `k` descending factors `n * (n-1) * ... * (n-k+1)`.
///
/// Returns `0` if `n < k` (there is nothing to choose).
fn descending_product(n: u64, k: u64) -> BigUint {
    debug_assert!(k >= 1, "descending_product requires k >= 1");
    if n < k {
        return BigUint::zero();
    }
    let mut acc = BigUint::from(n);
    let mut i = n - 1;
    while i > n - k {
        acc *= i;
        i -= 1;
    }
    acc
}

/// `C(n, k) = n * (n-1) * ... * (n-k+1) / k!`. Returns `0` when `n < k`.
pub fn choose(n: u64, k: u64) -> BigUint {
    if n < k {
        return BigUint::zero();
    }
    let numerator = descending_product(n, k);
    let factorial_k = crate::bigint::factorial(k);
    div_exact(&numerator, &factorial_k)
}

/// Add `C(n, k)` to `acc`, reusing the caller-maintained `k!` in
/// `denom_fact` instead of recomputing it on every call.
pub fn accumulate_location(n: u64, k: u64, acc: &mut BigUint, denom_fact: &BigUint) {
    if n < k {
        return;
    }
    let numerator = descending_product(n, k);
    *acc += div_exact(&numerator, denom_fact);
}

/// Multiply `combiner` in place by `C(n, k)`, reusing `denom_fact == k!`.
pub fn update_combiner(combiner: &mut BigUint, n: u64, k: u64, denom_fact: &BigUint) {
    if n < k {
        *combiner = BigUint::zero();
        return;
    }
    let numerator = descending_product(n, k);
    *combiner *= div_exact(&numerator, denom_fact);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn choose_matches_pascals_triangle() {
        assert_eq!(choose(5, 1), BigUint::from(5u32));
        assert_eq!(choose(5, 2), BigUint::from(10u32));
        assert_eq!(choose(5, 5), BigUint::from(1u32));
        assert_eq!(choose(10, 3), BigUint::from(120u32));
        assert_eq!(choose(2, 5), BigUint::zero());
    }

    #[test]
    fn accumulate_location_matches_choose() {
        let mut acc = BigUint::zero();
        let denom = crate::bigint::factorial(3);
        accumulate_location(10, 3, &mut acc, &denom);
        assert_eq!(acc, choose(10, 3));
        accumulate_location(7, 3, &mut acc, &denom);
        assert_eq!(acc, choose(10, 3) + choose(7, 3));
    }

    #[test]
    fn update_combiner_multiplies_in_place() {
        let mut combiner = BigUint::one();
        let denom = crate::bigint::factorial(2);
        update_combiner(&mut combiner, 6, 2, &denom);
        assert_eq!(combiner, choose(6, 2));
        update_combiner(&mut combiner, 6, 2, &denom);
        assert_eq!(combiner, choose(6, 2) * choose(6, 2));
    }

    #[test]
    fn choose_brute_force_cross_check() {
        fn brute(n: u64, k: u64) -> u64 {
            if k > n {
                return 0;
            }
            let mut num = 1u64;
            let mut den = 1u64;
            for i in 0..k {
                num *= n - i;
                den *= i + 1;
            }
            num / den
        }
        for n in 0..15 {
            for k in 1..=15 {
                assert_eq!(choose(n, k), BigUint::from(brute(n, k)), "n={n} k={k}");
            }
        }
    }
}
