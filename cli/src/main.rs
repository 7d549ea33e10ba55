// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally CLI
//!
//! Entry point for the `tally` binary:
//!
//! - `keygen`   generate a keypair into a file
//! - `transfer` sign a transfer, optionally amended with more recipients
//! - `reward`   print a mining reward transaction
//! - `verify`   validate a transaction from a file or stdin
//! - `version`  print build version information
//!
//! `verify` exits with status 1 when the transaction is rejected.

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use cli::{Commands, TallyCli};
use logging::LogFormat;

fn main() -> Result<ExitCode> {
    let cli = TallyCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Keygen(args) => {
            let address = commands::keygen(&args)?;
            println!("{}", address);
        }
        Commands::Transfer(args) => {
            let tx = commands::transfer(&args)?;
            println!("{}", tx.to_json()?);
        }
        Commands::Reward(args) => {
            let tx = commands::reward(&args);
            println!("{}", tx.to_json()?);
        }
        Commands::Verify(args) => {
            let verdict = commands::verify(&args.input)?;
            println!("{}", verdict);
            if !verdict.is_accepted() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Version => {
            for line in commands::version_lines() {
                println!("{}", line);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
