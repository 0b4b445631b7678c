//! Combinatorial encoder: byte message + frequency table → one big integer.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use crate::binomial;
use crate::error::Result;
use crate::freq_table::FreqTable;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Bookkeeping the reference implementation prints unconditionally with
/// `cout`; kept here as data so the caller can log it (or not) instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub total_symbols: u64,
    pub unique_symbols: usize,
    pub encoded_bits: u64,
    /// Bit length of the final `multiply_combiner`: the theoretical code
    /// space for this frequency table.
    pub theoretical_bits: u64,
    pub shannon_bits: f64,
}

impl Stats {
    pub fn bits_saved(&self) -> f64 {
        self.shannon_bits - self.theoretical_bits as f64
    }
}

/// Encode `message` against `table` into a single big integer, along with
/// the statistics the reference implementation reports.
///
/// `table` must already describe `message`'s histogram (as produced by
/// [`FreqTable::from_message`]); this is not re-checked here.
pub fn encode(message: &[u8], table: &FreqTable) -> Result<(BigUint, Stats)> {
    let null_symbol = table.null_symbol();
    let mut buffer = message.to_vec();

    let mut remaining_loc = table.total_symbols();
    let mut data_accumulator = BigUint::zero();
    let mut multiply_combiner = BigUint::one();

    // The symbol at index 255 (most frequent) is never encoded: its
    // positions are whatever the decoder hasn't filled by the time it gets
    // there.
    for i in 0..(crate::freq_table::ALPHABET_SIZE - 1) {
        let entry = table.entry(i);
        if entry.count == 0 {
            continue;
        }
        let symbol = entry.symbol;
        let count = entry.count;

        let mut symbol_accumulator = BigUint::zero();
        let mut denom_fact = BigUint::one();
        let mut k = 1u64;
        let mut removed_loc = 0u64;

        for p in 0..buffer.len() {
            if buffer[p] == symbol {
                binomial::accumulate_location(
                    p as u64 - removed_loc,
                    k,
                    &mut symbol_accumulator,
                    &denom_fact,
                );
                buffer[p] = null_symbol;
                if k < count {
                    k += 1;
                    denom_fact *= k;
                } else {
                    break;
                }
            } else if buffer[p] == null_symbol {
                removed_loc += 1;
            }
        }

        log::trace!(
            "symbol {symbol:#04x} (count {count}): sum of binomials = {symbol_accumulator}"
        );

        data_accumulator += &multiply_combiner * &symbol_accumulator;

        // Advancing the combiner is needed even for the second-to-last
        // symbol, since the final `multiply_combiner` also doubles as the
        // theoretical code space reported in `Stats`.
        binomial::update_combiner(&mut multiply_combiner, remaining_loc, count, &denom_fact);
        remaining_loc -= count;
    }

    let shannon_bits = shannon_limit_bits(table);
    let stats = Stats {
        total_symbols: table.total_symbols(),
        unique_symbols: table.nonzero_count(),
        encoded_bits: crate::bigint::bit_length(&data_accumulator),
        theoretical_bits: crate::bigint::bit_length(&multiply_combiner),
        shannon_bits,
    };
    log::debug!(
        "encoded {} symbols ({} unique) into {} bits (theoretical max {} bits, Shannon limit {:.1} bits)",
        stats.total_symbols,
        stats.unique_symbols,
        stats.encoded_bits,
        stats.theoretical_bits,
        stats.shannon_bits,
    );

    Ok((data_accumulator, stats))
}

/// Non-adaptive, static-frequency Shannon entropy bound: `H(M) * |M|` bits.
fn shannon_limit_bits(table: &FreqTable) -> f64 {
    let total = table.total_symbols() as f64;
    if total == 0.0 {
        return 0.0;
    }
    let mut entropy = 0.0;
    for i in 0..crate::freq_table::ALPHABET_SIZE {
        let count = table.entry(i).count;
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy * total
}
