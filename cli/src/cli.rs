//! # CLI Interface
//!
//! Command-line structure for `tally`, defined with `clap` derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build, amend and verify Tally transactions.
///
/// Transactions are printed to stdout as JSON. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Build and verify signed Tally transactions",
    version,
    propagate_version = true
)]
pub struct TallyCli {
    /// Log format: "pretty" or "json".
    #[arg(
        long,
        global = true,
        env = "TALLY_LOG_FORMAT",
        default_value = "pretty"
    )]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new keypair and write its secret key to a file.
    Keygen(KeygenArgs),
    /// Sign a transfer from a key file, with optional extra recipients.
    Transfer(TransferArgs),
    /// Print a mining reward transaction for an address.
    Reward(RewardArgs),
    /// Validate a transaction read from a file or stdin.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Where to write the hex-encoded secret key. Must not exist.
    #[arg(long, short = 'o', env = "TALLY_KEY_FILE")]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct TransferArgs {
    /// File holding the payer's hex-encoded secret key.
    #[arg(long, short = 'k', env = "TALLY_KEY_FILE")]
    pub key: PathBuf,

    /// Balance the payer holds when signing.
    #[arg(long, env = "TALLY_BALANCE", default_value_t = tally_protocol::config::STARTING_BALANCE)]
    pub balance: u64,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Amount to send to `--to`.
    #[arg(long)]
    pub amount: u64,

    /// Additional recipient as `<address>=<amount>`, applied as an
    /// amendment. May be repeated; repeats of one address accumulate.
    #[arg(long = "also", value_name = "ADDR=AMOUNT", value_parser = parse_allocation)]
    pub also: Vec<(String, u64)>,
}

#[derive(Parser, Debug)]
pub struct RewardArgs {
    /// Address of the miner being rewarded.
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Transaction JSON file, or `-` for stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Parses `<address>=<amount>`.
fn parse_allocation(s: &str) -> Result<(String, u64), String> {
    let (address, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected <address>=<amount>, got '{}'", s))?;
    let address = address.trim();
    if address.is_empty() {
        return Err("address must not be empty".to_string());
    }
    let amount = amount
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    Ok((address.to_string(), amount))
}
