//! Command-line front end: compress a file into a `.vli` container, or
//! decompress one back.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

mod cli;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    match Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
