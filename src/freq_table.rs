//! Frequency table: histogram construction, the composite sort order, and
//! the bit-packed, self-delimiting serialization format.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use crate::error::{Result, ValliError};

/// Number of distinct byte values; the table always has exactly this many
/// entries, one per possible symbol.
pub const ALPHABET_SIZE: usize = 256;

/// Counts above this many bits cannot be represented by the 6-bit header.
const MAX_COUNT_BITS: u32 = 63;

/// A single `(symbol, count)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreqEntry {
    pub symbol: u8,
    pub count: u64,
}

/// A histogram over all 256 byte values, sorted ascending by `(count,
/// symbol)`.
///
/// The reference implementation packs `(count, symbol)` into one 64-bit
/// word (count in the high 56 bits, symbol in the low 8) purely so a
/// single array sort produces the required order. Sorting a tuple
/// `(count, symbol)` directly produces the exact same total order without
/// the bit-packing, so that's what this does; the composite key is an
/// implementation detail of the C++ original, not a requirement on a
/// reimplementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreqTable {
    entries: [FreqEntry; ALPHABET_SIZE],
}

impl FreqTable {
    /// Build and validate a table from the histogram of `message`.
    pub fn from_message(message: &[u8]) -> Result<Self> {
        let mut counts = [0u64; ALPHABET_SIZE];
        for &b in message {
            counts[b as usize] += 1;
            if counts[b as usize] >= (1u64 << 56) {
                return Err(ValliError::CountOverflow);
            }
        }

        let mut entries: Vec<FreqEntry> = (0..ALPHABET_SIZE)
            .map(|i| FreqEntry { symbol: i as u8, count: counts[i] })
            .collect();
        entries.sort_by_key(|e| (e.count, e.symbol));

        let entries: [FreqEntry; ALPHABET_SIZE] = entries
            .try_into()
            .expect("exactly ALPHABET_SIZE entries were built");

        let table = FreqTable { entries };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        let nonzero = self.entries.iter().filter(|e| e.count > 0).count();
        if nonzero == ALPHABET_SIZE {
            return Err(ValliError::FullAlphabet);
        }
        if nonzero < 2 {
            return Err(ValliError::InsufficientAlphabet);
        }
        Ok(())
    }

    /// The entry at sorted index `idx` (`0` is rarest, `255` is most common).
    pub fn entry(&self, idx: usize) -> FreqEntry {
        self.entries[idx]
    }

    /// The number of entries with non-zero count.
    pub fn nonzero_count(&self) -> usize {
        self.entries.iter().filter(|e| e.count > 0).count()
    }

    /// The byte value used as the in-place "already encoded" marker: the
    /// rarest entry, guaranteed to have count zero by `validate`.
    pub fn null_symbol(&self) -> u8 {
        self.entries[0].symbol
    }

    /// The most frequent byte value, used as the decoder's placeholder.
    pub fn last_symbol(&self) -> u8 {
        self.entries[ALPHABET_SIZE - 1].symbol
    }

    /// Sum of all counts; the length of the message this table describes.
    pub fn total_symbols(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Re-sort a copy of this table. Sorting an already-sorted table is a
    /// no-op (property 8 of the spec's testable properties).
    pub fn resorted(&self) -> Self {
        let mut entries = self.entries;
        entries.sort_by_key(|e| (e.count, e.symbol));
        FreqTable { entries }
    }

    /// Serialize to the bit-packed, self-delimiting wire format described
    /// in the file-format section: a 6-bit header, then counts packed
    /// largest-to-smallest with each field's width equal to the *previous*
    /// count's bit length, terminated by an implicit zero count, followed
    /// by the corresponding symbol bytes in the same order.
    pub fn serialize(&self) -> Vec<u8> {
        let max_count = self.entries[ALPHABET_SIZE - 1].count;
        let header = bit_length(max_count);
        debug_assert!(header <= MAX_COUNT_BITS, "count overflowed the 56-bit field");

        let mut writer = BitWriter::new();
        writer.write_bits(header as u64, 6);

        let mut field_width = header;
        let mut symbols = Vec::new();
        for idx in (0..ALPHABET_SIZE).rev() {
            let count = self.entries[idx].count;
            writer.write_bits(count, field_width);
            if count == 0 {
                break;
            }
            symbols.push(self.entries[idx].symbol);
            field_width = bit_length(count);
        }

        let mut out = writer.finish();
        out.extend(symbols);
        out
    }

    /// Inverse of [`serialize`](Self::serialize). Leaves no way to know how
    /// many bytes were consumed directly; use [`deserialize_with_len`] when
    /// the caller needs the cursor position (the I/O boundary does, to find
    /// where the big integer begins).
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Self::deserialize_with_len(bytes).map(|(table, _)| table)
    }

    /// Like [`deserialize`](Self::deserialize), also returning the number
    /// of bytes consumed from `bytes`, so the caller can locate the
    /// remainder of the stream (the exported big integer).
    pub fn deserialize_with_len(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut reader = BitReader::new(bytes);

        let header = reader.read_bits(6)? as u32;
        if header > MAX_COUNT_BITS {
            return Err(ValliError::MalformedHeader(format!(
                "header bit length {header} exceeds 63"
            )));
        }

        let mut counts = [0u64; ALPHABET_SIZE];
        let mut field_width = header;
        let mut idx: isize = (ALPHABET_SIZE - 1) as isize;
        let mut symbol_count = 0usize;
        loop {
            if field_width > MAX_COUNT_BITS {
                return Err(ValliError::MalformedHeader(format!(
                    "count bit length {field_width} exceeds 63"
                )));
            }
            let count = reader.read_bits(field_width)?;
            if idx < 0 {
                return Err(ValliError::MalformedHeader(
                    "more non-zero counts than fit in the table".into(),
                ));
            }
            counts[idx as usize] = count;
            if count == 0 {
                break;
            }
            symbol_count += 1;
            field_width = bit_length(count);
            idx -= 1;
        }

        reader.align_to_next_byte();
        let mut symbols = Vec::with_capacity(symbol_count);
        for _ in 0..symbol_count {
            symbols.push(reader.read_u8()?);
        }

        let mut present = [false; ALPHABET_SIZE];
        for &s in &symbols {
            if present[s as usize] {
                return Err(ValliError::MalformedHeader(format!(
                    "duplicate symbol {s} in frequency table"
                )));
            }
            present[s as usize] = true;
        }

        let mut symbol_arr = [0u8; ALPHABET_SIZE];
        for (offset, &sym) in symbols.iter().enumerate() {
            symbol_arr[ALPHABET_SIZE - 1 - offset] = sym;
        }
        // Zero-count slots are back-filled with every byte value absent
        // from the non-zero region, in ascending order, preserving the
        // invariant that the table is a permutation of all 256 byte values.
        let mut next_idx = 0usize;
        for (b, &is_present) in present.iter().enumerate() {
            if !is_present {
                symbol_arr[next_idx] = b as u8;
                next_idx += 1;
            }
        }

        let entries: Vec<FreqEntry> = (0..ALPHABET_SIZE)
            .map(|i| FreqEntry { symbol: symbol_arr[i], count: counts[i] })
            .collect();
        let entries: [FreqEntry; ALPHABET_SIZE] =
            entries.try_into().expect("exactly ALPHABET_SIZE entries were built");

        let table = FreqTable { entries };
        table.validate()?;
        Ok((table, reader.bytes_consumed()))
    }
}

/// `ceil(log2(count + 1))`, i.e. the number of bits needed to represent
/// `count`. `0` needs `0` bits, matching `BigUint::bits()`'s convention.
fn bit_length(count: u64) -> u32 {
    u64::BITS - count.leading_zeros()
}

/// Bit writer packing fields little-endian within each byte (the first bit
/// written lands in bit 0), matching the file format exactly.
struct BitWriter {
    buf: Vec<u8>,
    current: u8,
    bit_offset: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self { buf: Vec::new(), current: 0, bit_offset: 0 }
    }

    /// Write the `nbits` least-significant bits of `value`.
    fn write_bits(&mut self, mut value: u64, mut nbits: u32) {
        while nbits > 0 {
            let space = 8 - self.bit_offset;
            let take = nbits.min(space);
            let mask = (1u64 << take) - 1;
            self.current |= ((value & mask) as u8) << self.bit_offset;
            value >>= take;
            self.bit_offset += take;
            nbits -= take;
            if self.bit_offset == 8 {
                self.buf.push(self.current);
                self.current = 0;
                self.bit_offset = 0;
            }
        }
    }

    /// Flush any partial byte (wasting up to 7 bits) and return the buffer.
    fn finish(mut self) -> Vec<u8> {
        if self.bit_offset != 0 {
            self.buf.push(self.current);
        }
        self.buf
    }
}

/// Reader for the bit format [`BitWriter`] produces.
struct BitReader<'a> {
    buf: &'a [u8],
    byte_idx: usize,
    bit_offset: u32,
}

impl<'a> BitReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, byte_idx: 0, bit_offset: 0 }
    }

    fn read_bits(&mut self, nbits: u32) -> Result<u64> {
        let mut value: u64 = 0;
        let mut got = 0u32;
        while got < nbits {
            if self.byte_idx >= self.buf.len() {
                return Err(ValliError::MalformedHeader("unexpected end of input".into()));
            }
            let byte = self.buf[self.byte_idx];
            let avail = 8 - self.bit_offset;
            let take = (nbits - got).min(avail);
            let mask = if take == 8 { 0xFFu8 } else { ((1u16 << take) - 1) as u8 };
            let bits = (byte >> self.bit_offset) & mask;
            value |= (bits as u64) << got;
            got += take;
            self.bit_offset += take;
            if self.bit_offset == 8 {
                self.bit_offset = 0;
                self.byte_idx += 1;
            }
        }
        Ok(value)
    }

    /// Discard any unread bits of the current byte (the encoder's flush
    /// padding) so the next read starts on a byte boundary.
    fn align_to_next_byte(&mut self) {
        if self.bit_offset != 0 {
            self.byte_idx += 1;
            self.bit_offset = 0;
        }
    }

    fn read_u8(&mut self) -> Result<u8> {
        if self.byte_idx >= self.buf.len() {
            return Err(ValliError::MalformedHeader("unexpected end of input".into()));
        }
        let byte = self.buf[self.byte_idx];
        self.byte_idx += 1;
        Ok(byte)
    }

    fn bytes_consumed(&self) -> usize {
        self.byte_idx
    }
}
