//! On-disk container: frequency table header followed by the exported
//! code, as a flat byte stream with no additional framing beyond what
//! [`crate::freq_table::FreqTable::serialize`] already self-delimits.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use crate::bigint;
use crate::error::Result;
use crate::freq_table::FreqTable;
use num_bigint::BigUint;
use std::io::{Read, Write};
use std::path::Path;

/// Write `table` followed by the little-endian export of `code` to `path`.
pub fn write_compressed(path: &Path, table: &FreqTable, code: &BigUint) -> Result<()> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(&table.serialize());
    out.extend_from_slice(&bigint::export_le(code));
    std::fs::File::create(path)?.write_all(&out)?;
    log::debug!("wrote {} bytes to {}", out.len(), path.display());
    Ok(())
}

/// Read a frequency table and code back from `path`.
pub fn read_compressed(path: &Path) -> Result<(FreqTable, BigUint)> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;
    let (table, header_len) = FreqTable::deserialize_with_len(&bytes)?;
    let code = bigint::import_le(&bytes[header_len..]);
    log::debug!(
        "read {} header bytes and {} code bytes from {}",
        header_len,
        bytes.len() - header_len,
        path.display()
    );
    Ok((table, code))
}
