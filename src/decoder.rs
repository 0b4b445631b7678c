//! Combinatorial decoder: big integer + frequency table → byte message.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use crate::binomial;
use crate::error::{Result, ValliError};
use crate::freq_table::{FreqTable, ALPHABET_SIZE};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

/// Decode `code` against `table` back into the original byte message.
///
/// Returns [`ValliError::CorruptCode`] if `code` falls outside the
/// theoretical space the table describes; the reference implementation
/// does not detect this case, but a conforming port should.
pub fn decode(code: &BigUint, table: &FreqTable) -> Result<Vec<u8>> {
    let total_symbols = table.total_symbols();
    let last_symbol = table.last_symbol();
    let mut output = vec![last_symbol; total_symbols as usize];
    let mut remaining_locations = total_symbols;
    let mut compressed_data = code.clone();

    let mut symbol_idx = 0usize;
    while table.entry(symbol_idx).count == 0 {
        symbol_idx += 1;
    }

    while symbol_idx < ALPHABET_SIZE - 1 {
        let entry = table.entry(symbol_idx);
        let symbol = entry.symbol;
        let original_count = entry.count;

        let uncombiner = binomial::choose(remaining_locations, original_count);
        if uncombiner.is_zero() {
            return Err(ValliError::CorruptCode);
        }

        let mut extracted_combo = if symbol_idx < ALPHABET_SIZE - 2 {
            let (quotient, remainder) = compressed_data.div_rem(&uncombiner);
            compressed_data = quotient;
            remainder
        } else {
            // Last encoded symbol: what remains of `compressed_data` is
            // already this symbol's sum of binomials.
            if compressed_data >= uncombiner {
                return Err(ValliError::CorruptCode);
            }
            compressed_data.clone()
        };

        log::trace!(
            "symbol {symbol:#04x} (count {original_count}): extracted combo = {extracted_combo}"
        );

        let insert_offset_start = (total_symbols - remaining_locations) as i64;
        let mut insert_offset = insert_offset_start;
        let mut last_loc_idx: i64 = total_symbols as i64 - 1;

        let mut k = original_count;
        let mut factorial = crate::bigint::factorial(k);

        while extracted_combo > BigUint::from(k) {
            if k == 0 {
                return Err(ValliError::CorruptCode);
            }
            let scaled = &extracted_combo * &factorial;
            let root = crate::bigint::nth_root(&scaled, k);
            let root: u64 = root
                .to_u64()
                .ok_or(ValliError::CorruptCode)?;
            let mut loc_idx: i64 = (root + k / 2) as i64;

            let mut est = binomial::choose(loc_idx.max(0) as u64, k);

            if est > extracted_combo {
                // Overshot: N-1 choose K = est * (N-K) / N.
                if loc_idx == 0 {
                    return Err(ValliError::CorruptCode);
                }
                est = &est * (loc_idx as u64 - k);
                est = crate::bigint::div_exact(&est, &BigUint::from(loc_idx as u64));
                loc_idx -= 1;
            }

            extracted_combo -= &est;
            // Delta to the next higher binomial: C(loc_idx, k-1).
            let mut delta = &est * k;
            let denom = loc_idx - k as i64 + 1;
            if denom > 0 {
                delta = crate::bigint::div_exact(&delta, &BigUint::from(denom as u64));
            }

            while delta <= extracted_combo && extracted_combo > BigUint::from(k) {
                extracted_combo -= &delta;
                loc_idx += 1;
                if loc_idx <= k as i64 {
                    delta = BigUint::one();
                    loc_idx = k as i64;
                } else {
                    delta *= loc_idx as u64;
                }
                let denom = loc_idx - (k as i64 - 1);
                if denom != 0 {
                    delta = crate::bigint::div_exact(&delta, &BigUint::from(denom as u64));
                }
            }

            place_symbol(
                &mut output,
                last_symbol,
                symbol,
                loc_idx,
                &mut insert_offset,
                &mut last_loc_idx,
            )?;

            factorial = crate::bigint::div_exact(&factorial, &BigUint::from(k));
            k -= 1;
        }

        if k != 0 && extracted_combo <= BigUint::from(k) {
            let combo: u64 = extracted_combo.to_u64().ok_or(ValliError::CorruptCode)?;
            place_tail(&mut output, last_symbol, symbol, k, combo)?;
        }

        remaining_locations -= original_count;
        symbol_idx += 1;
    }

    Ok(output)
}

/// Translate a relative `loc_idx` (among not-yet-placed positions) to an
/// absolute index and write `symbol` there, per the absolute-index
/// translation rule: walk backward from the previous placement, skipping
/// already-placed non-last-symbol bytes, decrementing `insert_offset` for
/// each one, until the walk reaches `loc_idx + insert_offset`.
fn place_symbol(
    output: &mut [u8],
    last_symbol: u8,
    symbol: u8,
    loc_idx: i64,
    insert_offset: &mut i64,
    last_loc_idx: &mut i64,
) -> Result<()> {
    if loc_idx < 0 {
        return Err(ValliError::CorruptCode);
    }
    let bound = loc_idx + *insert_offset;
    let mut i = *last_loc_idx;
    while i >= bound && *insert_offset != 0 {
        let idx: usize = i.try_into().map_err(|_| ValliError::CorruptCode)?;
        if *output.get(idx).ok_or(ValliError::CorruptCode)? != last_symbol {
            *insert_offset -= 1;
        }
        i -= 1;
    }
    *last_loc_idx = loc_idx + *insert_offset - 1;
    let dest: usize = (loc_idx + *insert_offset)
        .try_into()
        .map_err(|_| ValliError::CorruptCode)?;
    let slot = output.get_mut(dest).ok_or(ValliError::CorruptCode)?;
    *slot = symbol;
    Ok(())
}

/// Trivial tail placement once `extracted_combo <= k`: scan forward over
/// remaining sentinel (last-symbol) positions, placing `symbol` at each one.
///
/// `extracted_combo` is fixed for the whole tail (it is never decremented);
/// `k` counts down by one per placement. Each iteration re-compares the two:
/// only the iteration where the *current* `k` equals `extracted_combo` skips
/// one extra sentinel first. This is not a one-shot decision made up front —
/// the reference decoder's do-while loop re-checks `extracted_combo == k` on
/// every pass, so the skip can land on any iteration of the tail, not just
/// the first.
fn place_tail(
    output: &mut [u8],
    last_symbol: u8,
    symbol: u8,
    mut k: u64,
    extracted_combo: u64,
) -> Result<()> {
    let mut null_idx = 0usize;
    loop {
        while *output.get(null_idx).ok_or(ValliError::CorruptCode)? != last_symbol {
            null_idx += 1;
        }
        if extracted_combo == k {
            null_idx += 1;
            while *output.get(null_idx).ok_or(ValliError::CorruptCode)? != last_symbol {
                null_idx += 1;
            }
        }
        output[null_idx] = symbol;
        k -= 1;
        if k == 0 {
            break;
        }
    }
    Ok(())
}
