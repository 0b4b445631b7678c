//! `clap`-derived command surface: `compress`/`decompress` subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use valli::encoder::encode;
use valli::error::ValliError;
use valli::format::{read_compressed, write_compressed};
use valli::freq_table::FreqTable;

#[derive(Parser)]
#[command(name = "valli", about = "Combinatorial number system entropy coder")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a file, writing `<path>.vli`.
    Compress { path: PathBuf },
    /// Decompress a `.vli` file, writing `<basename>.decom`.
    Decompress { path: PathBuf },
}

impl Cli {
    pub fn run(self) -> Result<(), ValliError> {
        match self.command {
            Command::Compress { path } => compress(&path),
            Command::Decompress { path } => decompress(&path),
        }
    }
}

fn compress(path: &std::path::Path) -> Result<(), ValliError> {
    let message = std::fs::read(path)?;
    let table = FreqTable::from_message(&message)?;
    let (code, stats) = encode(&message, &table)?;

    log::info!(
        "{}: {} bytes -> {} bits ({} unique symbols, {:.1} bits under the Shannon limit)",
        path.display(),
        message.len(),
        stats.encoded_bits,
        stats.unique_symbols,
        stats.bits_saved(),
    );

    let out_path = append_extension(path, "vli");
    write_compressed(&out_path, &table, &code)?;
    println!("wrote {}", out_path.display());
    Ok(())
}

fn decompress(path: &std::path::Path) -> Result<(), ValliError> {
    if path.extension().and_then(|e| e.to_str()) != Some("vli") {
        return Err(ValliError::MalformedHeader(
            "expected a .vli file".to_string(),
        ));
    }
    let (table, code) = read_compressed(path)?;
    let message = valli::decoder::decode(&code, &table)?;

    let out_path = path.with_extension("decom");
    std::fs::write(&out_path, &message)?;
    log::info!("{}: recovered {} bytes", path.display(), message.len());
    println!("wrote {}", out_path.display());
    Ok(())
}

fn append_extension(path: &std::path::Path, ext: &str) -> PathBuf {
    let mut out = path.as_os_str().to_owned();
    out.push(".");
    out.push(ext);
    PathBuf::from(out)
}
