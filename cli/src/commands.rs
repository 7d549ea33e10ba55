//! Subcommand implementations.
//!
//! Each command returns what it would print so it can be tested without
//! capturing stdout. `main` does the printing.

use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use tally_protocol::crypto::TallyKeypair;
use tally_protocol::transaction::{validate_json, Transaction, Verdict};
use tally_protocol::vault::Wallet;

use crate::cli::{KeygenArgs, RewardArgs, TransferArgs};

/// Generates a keypair, writes the secret key as hex to `args.out` and
/// returns the new address.
///
/// The file is created exclusively, and on Unix with mode 0600 from the
/// start, so an existing file is never overwritten and the key is never
/// readable by other users.
pub fn keygen(args: &KeygenArgs) -> Result<String> {
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(&args.out) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("refusing to overwrite existing key file {}", args.out.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to create key file {}", args.out.display()))
        }
    };

    let keypair = TallyKeypair::generate();
    file.write_all(hex::encode(keypair.secret_key_bytes()).as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write key to {}", args.out.display()))?;

    let address = keypair.address();
    tracing::info!(address = %address, path = %args.out.display(), "keypair generated");
    Ok(address)
}

/// Loads a wallet from a hex key file with the given balance.
pub fn load_wallet(path: &Path, balance: u64) -> Result<Wallet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    let keypair = TallyKeypair::from_hex(&raw)
        .with_context(|| format!("invalid key in {}", path.display()))?;
    Ok(Wallet::from_keypair(keypair, balance))
}

/// Builds the signed transfer and applies each `--also` as an amendment.
pub fn transfer(args: &TransferArgs) -> Result<Transaction> {
    let wallet = load_wallet(&args.key, args.balance)?;

    let mut tx = wallet
        .create_transaction(&args.to, args.amount)
        .with_context(|| format!("cannot send {} to {}", args.amount, args.to))?;

    for (recipient, amount) in &args.also {
        tx.update(&wallet, recipient, *amount)
            .with_context(|| format!("cannot add {} for {}", amount, recipient))?;
    }

    tracing::info!(
        id = %tx.id,
        payer = %wallet.address(),
        outputs = tx.output_map.len(),
        "transfer signed"
    );
    Ok(tx)
}

pub fn reward(args: &RewardArgs) -> Transaction {
    let tx = Transaction::reward_to(&args.to);
    tracing::info!(id = %tx.id, miner = %args.to, "reward issued");
    tx
}

/// Reads a transaction from `input` (`-` for stdin) and validates it.
///
/// Malformed JSON or a structurally broken transaction is an error, not a
/// rejected verdict.
pub fn verify(input: &Path) -> Result<Verdict> {
    let raw = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read transaction from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let verdict = validate_json(&raw).context("transaction could not be checked")?;
    tracing::info!(%verdict, "transaction checked");
    Ok(verdict)
}

/// Version lines for the `version` subcommand.
pub fn version_lines() -> Vec<String> {
    vec![
        format!("tally     {}", env!("CARGO_PKG_VERSION")),
        format!("protocol  {}", tally_protocol::config::PROTOCOL_VERSION),
        format!("signing   {}", tally_protocol::config::SIGNING_ALGORITHM),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tally_protocol::transaction::Rejection;

    fn keyfile(dir: &tempfile::TempDir) -> (PathBuf, String) {
        let out = dir.path().join("keys").join("alice.hex");
        let address = keygen(&KeygenArgs { out: out.clone() }).unwrap();
        (out, address)
    }

    fn transfer_args(key: PathBuf, also: Vec<(String, u64)>) -> TransferArgs {
        TransferArgs {
            key,
            balance: 100,
            to: "bob".to_string(),
            amount: 30,
            also,
        }
    }

    #[test]
    fn keygen_writes_loadable_key() {
        let dir = tempfile::tempdir().unwrap();
        let (path, address) = keyfile(&dir);

        let wallet = load_wallet(&path, 5).unwrap();
        assert_eq!(wallet.address(), address);
        assert_eq!(wallet.balance(), 5);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn keygen_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = keyfile(&dir);
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(keygen(&KeygenArgs { out: path.clone() }).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn keygen_leaves_foreign_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.hex");
        std::fs::write(&path, "someone else's key").unwrap();

        let err = keygen(&KeygenArgs { out: path.clone() }).unwrap_err();

        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "someone else's key");
    }

    #[test]
    fn load_wallet_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.hex");
        std::fs::write(&path, "not hex").unwrap();

        assert!(load_wallet(&path, 1).is_err());
        assert!(load_wallet(&dir.path().join("missing.hex"), 1).is_err());
    }

    #[test]
    fn transfer_applies_amendments() {
        let dir = tempfile::tempdir().unwrap();
        let (key, address) = keyfile(&dir);

        let tx = transfer(&transfer_args(
            key,
            vec![("carol".to_string(), 20), ("bob".to_string(), 5)],
        ))
        .unwrap();

        assert_eq!(tx.output_map["bob"], 35);
        assert_eq!(tx.output_map["carol"], 20);
        assert_eq!(tx.output_map[&address], 45);
        assert!(tx.is_valid());
    }

    #[test]
    fn transfer_overspend_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (key, _) = keyfile(&dir);

        let err = transfer(&transfer_args(key, vec![("carol".to_string(), 71)])).unwrap_err();
        assert!(format!("{:#}", err).contains("carol"));
    }

    #[test]
    fn verify_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let (key, _) = keyfile(&dir);
        let tx = transfer(&transfer_args(key, vec![])).unwrap();

        let good = dir.path().join("tx.json");
        std::fs::write(&good, tx.to_json().unwrap()).unwrap();
        assert_eq!(verify(&good).unwrap(), Verdict::Accepted);

        let mut tampered = tx.clone();
        tampered.output_map.insert("bob".to_string(), 31);
        let bad = dir.path().join("tampered.json");
        std::fs::write(&bad, tampered.to_json().unwrap()).unwrap();
        assert!(matches!(
            verify(&bad).unwrap(),
            Verdict::Rejected(Rejection::BalanceMismatch { .. })
        ));
    }

    #[test]
    fn verify_accepts_reward() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reward.json");
        let tx = reward(&RewardArgs {
            to: "miner".to_string(),
        });
        std::fs::write(&path, tx.to_json().unwrap()).unwrap();

        assert!(verify(&path).unwrap().is_accepted());
    }

    #[test]
    fn verify_malformed_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.json");
        std::fs::write(&path, "{\"outputMap\": {}}").unwrap();

        assert!(verify(&path).is_err());
    }

    #[test]
    fn version_mentions_protocol() {
        let lines = version_lines();
        assert!(lines[1].contains(tally_protocol::config::PROTOCOL_VERSION));
    }
}
