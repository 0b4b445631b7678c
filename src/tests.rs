//! End-to-end scenarios and property checks spanning `freq_table`,
//! `encoder`, `decoder`, and `format` together.

use crate::binomial::choose;
use crate::decoder::decode;
use crate::encoder::encode;
use crate::format::{read_compressed, write_compressed};
use crate::freq_table::FreqTable;
use num_bigint::BigUint;
use proptest::prelude::*;

fn roundtrip(message: &[u8]) -> Vec<u8> {
    let table = FreqTable::from_message(message).unwrap();
    let (code, _) = encode(message, &table).unwrap();
    decode(&code, &table).unwrap()
}

#[test]
fn s1_two_symbol_alternation() {
    assert_eq!(roundtrip(b"ababab"), b"ababab");
}

#[test]
fn s2_skewed_distribution() {
    // 7 'a', 1 'b': the trivial tail-placement branch (extracted_combo < k)
    // is exercised for 'a', the more frequent symbol.
    assert_eq!(roundtrip(b"aaaaaaab"), b"aaaaaaab");
}

#[test]
fn s3_three_symbols_with_zero_count_bytes() {
    assert_eq!(
        roundtrip(b"The quick brown fox"),
        b"The quick brown fox"
    );
}

#[test]
fn s4_single_run_then_one_different_byte() {
    assert_eq!(roundtrip(b"aaaab"), b"aaaab");
}

#[test]
fn s5_frequency_table_only_roundtrip() {
    // The scenario's exact counts include 2^40, which is not practical to
    // materialize as a message; `freq_table::tests::
    // zero_slots_cover_every_absent_byte_ascending` exercises the same
    // shape (increasing counts, several absent bytes) at sizes that are.
    // This checks the same serialize/deserialize/ascending-zero-slot
    // invariant end to end through `format`, independent of `encoder`.
    let mut message = Vec::new();
    message.extend(std::iter::repeat(0x41u8).take(1));
    message.extend(std::iter::repeat(0x42u8).take(5));
    message.extend(std::iter::repeat(0x43u8).take(100));
    message.extend(std::iter::repeat(0x44u8).take(1 << 16));

    let table = FreqTable::from_message(&message).unwrap();
    let bytes = table.serialize();
    let decoded = FreqTable::deserialize(&bytes).unwrap();
    assert_eq!(table, decoded);

    let zero_symbols: Vec<u8> = (0..256)
        .map(|i| decoded.entry(i))
        .take_while(|e| e.count == 0)
        .map(|e| e.symbol)
        .collect();
    assert!(zero_symbols.windows(2).all(|w| w[0] < w[1]));
    assert!(!zero_symbols.contains(&0x41));
    assert!(!zero_symbols.contains(&0x44));
}

#[test]
fn s6_zero_count_terminator_adjacency() {
    // second- and third-least-frequent non-zero symbols both have count 1,
    // forcing an all-1 tail in the count stream before the zero terminator.
    let message = b"xyzzzzzzzzzz";
    assert_eq!(roundtrip(message), message);
}

#[test]
fn property_table_permutation_invariant() {
    let table = FreqTable::from_message(b"The quick brown fox").unwrap();
    let bytes = table.serialize();
    let decoded = FreqTable::deserialize(&bytes).unwrap();
    let mut seen = [false; 256];
    for i in 0..256 {
        let s = decoded.entry(i).symbol;
        assert!(!seen[s as usize]);
        seen[s as usize] = true;
    }
}

#[test]
fn property_sum_of_counts_matches_decoded_length() {
    let message = b"aaaaaaab";
    let table = FreqTable::from_message(message).unwrap();
    let (code, _) = encode(message, &table).unwrap();
    let decoded = decode(&code, &table).unwrap();
    let total: u64 = (0..256).map(|i| table.entry(i).count).sum();
    assert_eq!(total, decoded.len() as u64);
}

#[test]
fn property_serialized_table_is_self_delimiting() {
    let message = b"The quick brown fox jumps over the lazy dog";
    let table = FreqTable::from_message(message).unwrap();
    let (code, _) = encode(message, &table).unwrap();

    let dir = std::env::temp_dir();
    let path = dir.join(format!("valli-selfdelim-test-{:x}.vli", std::process::id()));
    write_compressed(&path, &table, &code).unwrap();
    let (read_table, read_code) = read_compressed(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(read_table, table);
    assert_eq!(read_code, code);
}

#[test]
fn property_bit_length_bound() {
    let message = b"The quick brown fox jumps over the lazy dog";
    let table = FreqTable::from_message(message).unwrap();
    let (_, stats) = encode(message, &table).unwrap();
    assert!(stats.encoded_bits <= stats.theoretical_bits);
}

proptest! {
    #[test]
    fn prop_roundtrip_arbitrary_messages(message in prop::collection::vec(0u8..8, 2..200)) {
        // Restrict the alphabet to 0..8 so `message` almost surely contains
        // at least 2 distinct values without needing a retry loop, while
        // still exercising a variety of skews.
        let table = match FreqTable::from_message(&message) {
            Ok(t) => t,
            Err(_) => return Ok(()), // degenerate: fewer than 2 distinct bytes
        };
        let (code, _) = encode(&message, &table).unwrap();
        let decoded = decode(&code, &table).unwrap();
        prop_assert_eq!(decoded, message);
    }

    #[test]
    fn prop_resorting_is_idempotent(message in prop::collection::vec(any::<u8>(), 2..200)) {
        let table = match FreqTable::from_message(&message) {
            Ok(t) => t,
            Err(_) => return Ok(()),
        };
        prop_assert_eq!(table.resorted(), table);
    }

    #[test]
    fn prop_binomial_inversion_correctness(
        n in 1u64..1000,
        k_raw in 1u64..1000,
    ) {
        let k = k_raw.min(n);
        let target = choose(n, k);
        if target == BigUint::from(0u32) {
            return Ok(());
        }
        // C(n, k) itself is the boundary value C(loc_idx, k) for loc_idx = n;
        // check the invariant straddling it: C(n, k) <= target < C(n+1, k).
        prop_assert!(choose(n, k) <= target);
        prop_assert!(target < choose(n + 1, k));
    }
}
