//! Transaction validation.
//!
//! [`validate_transaction`] answers one question: may this transaction go
//! into a ledger? It uses public data only and never mutates anything.
//!
//! Two kinds of "no" are kept apart:
//!
//! - a [`Verdict::Rejected`] is an expected outcome for a well-formed
//!   transaction that breaks a rule (outputs don't add up, signature
//!   doesn't match). It carries a [`Rejection`] for the audit log.
//! - an `Err(TransactionError)` is a fault: the input isn't a transaction
//!   we can reason about at all.
//!
//! Ordinary and reward transactions follow different rules, chosen by the
//! input variant. Checks run cheapest first and stop at the first failure.

use std::fmt;

use thiserror::Error;
use tracing::{error, warn};

use super::builder::Transaction;
use super::error::TransactionError;
use super::signing::signable_bytes;
use super::types::{output_total, InputClaim, OutputMap, RewardInput, TransactionInput};
use crate::config::{MINING_REWARD, REWARD_INPUT};
use crate::crypto::signatures::verify_signature;

// ---------------------------------------------------------------------------
// Rejection / Verdict
// ---------------------------------------------------------------------------

/// Why a well-formed transaction was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Outputs do not sum to the amount the payer claimed.
    #[error("invalid transaction from {address}: outputs total {actual}, input claims {expected}")]
    BalanceMismatch {
        address: String,
        expected: u64,
        actual: u128,
    },

    /// The signature does not cover the current outputs under the payer's key.
    #[error("invalid signature from {address}")]
    InvalidSignature { address: String },

    /// A reward input that is not the system sentinel.
    #[error("forged reward input claiming address {address}")]
    ForgedRewardInput { address: String },

    /// A reward transaction must credit exactly one beneficiary.
    #[error("reward transaction must have exactly one output, found {outputs}")]
    RewardShape { outputs: usize },

    /// A reward transaction credited something other than the mining reward.
    #[error("reward transaction pays {actual}, expected {expected}")]
    RewardAmount { expected: u64, actual: u64 },
}

/// Outcome of validating a well-formed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The rejection reason, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates a transaction.
///
/// Ordinary (signed) transactions:
///
/// 1. **Conservation**: outputs must sum to `input.amount`.
/// 2. **Signature**: `input.signature` must verify under `input.address`
///    over exactly the current output map.
///
/// Reward transactions:
///
/// 1. **Sentinel**: the input must be exactly [`REWARD_INPUT`].
/// 2. **Shape**: exactly one output.
/// 3. **Amount**: that output is [`MINING_REWARD`].
///
/// Rejections are logged at `warn` with the payer address and reason.
///
/// # Errors
///
/// [`TransactionError::EmptyOutputs`] if the output map is empty.
pub fn validate_transaction(tx: &Transaction) -> Result<Verdict, TransactionError> {
    if tx.output_map.is_empty() {
        error!(id = %tx.id, payer = tx.payer(), "transaction has no outputs");
        return Err(TransactionError::EmptyOutputs);
    }

    let verdict = match &tx.input {
        TransactionInput::Signed(claim) => check_ordinary(claim, &tx.output_map),
        TransactionInput::Reward(reward) => check_reward(reward, &tx.output_map),
    };

    if let Verdict::Rejected(reason) = &verdict {
        warn!(id = %tx.id, payer = tx.payer(), %reason, "transaction rejected");
    }
    Ok(verdict)
}

/// Parses and validates a JSON-encoded transaction.
///
/// # Errors
///
/// [`TransactionError::Malformed`] if `raw` does not decode, plus anything
/// [`validate_transaction`] can return.
pub fn validate_json(raw: &str) -> Result<Verdict, TransactionError> {
    let tx = Transaction::from_json(raw).map_err(|e| {
        error!(error = %e, "rejecting undecodable transaction");
        e
    })?;
    validate_transaction(&tx)
}

fn check_ordinary(claim: &InputClaim, outputs: &OutputMap) -> Verdict {
    let total = output_total(outputs);
    if total != u128::from(claim.amount) {
        return Verdict::Rejected(Rejection::BalanceMismatch {
            address: claim.address.clone(),
            expected: claim.amount,
            actual: total,
        });
    }

    if !verify_signature(&claim.address, &signable_bytes(outputs), &claim.signature) {
        return Verdict::Rejected(Rejection::InvalidSignature {
            address: claim.address.clone(),
        });
    }

    Verdict::Accepted
}

fn check_reward(reward: &RewardInput, outputs: &OutputMap) -> Verdict {
    if *reward != REWARD_INPUT {
        return Verdict::Rejected(Rejection::ForgedRewardInput {
            address: reward.address.to_string(),
        });
    }

    let mut values = outputs.values();
    match (values.next(), values.next()) {
        (Some(&paid), None) if paid == MINING_REWARD => Verdict::Accepted,
        (Some(&paid), None) => Verdict::Rejected(Rejection::RewardAmount {
            expected: MINING_REWARD,
            actual: paid,
        }),
        _ => Verdict::Rejected(Rejection::RewardShape {
            outputs: outputs.len(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REWARD_INPUT_ADDRESS;
    use crate::crypto::keys::TallyKeypair;
    use crate::transaction::signing::PayerIdentity;
    use crate::vault::Wallet;
    use std::borrow::Cow;

    fn valid_tx() -> (Transaction, Wallet) {
        let wallet = Wallet::new();
        let tx = Transaction::new(&wallet, "recipient", 50).unwrap();
        (tx, wallet)
    }

    #[test]
    fn valid_transaction_passes() {
        let (tx, _) = valid_tx();
        assert_eq!(validate_transaction(&tx).unwrap(), Verdict::Accepted);
        assert!(tx.is_valid());
    }

    #[test]
    fn rejects_tampered_output_value() {
        let (mut tx, wallet) = valid_tx();
        tx.output_map.insert(wallet.address(), 999_999);

        match validate_transaction(&tx).unwrap() {
            Verdict::Rejected(Rejection::BalanceMismatch { address, .. }) => {
                assert_eq!(address, wallet.address());
            }
            other => panic!("expected BalanceMismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_balanced_but_resigned_by_stranger() {
        let (mut tx, _) = valid_tx();
        let stranger = Wallet::new();
        let TransactionInput::Signed(claim) = &mut tx.input else {
            unreachable!()
        };
        claim.signature = stranger.sign(&signable_bytes(&tx.output_map)).unwrap();

        match validate_transaction(&tx).unwrap() {
            Verdict::Rejected(Rejection::InvalidSignature { .. }) => {}
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn rejects_redistributed_outputs_with_same_total() {
        // Moving value between recipients keeps the sum but breaks the signature.
        let (mut tx, wallet) = valid_tx();
        *tx.output_map.get_mut("recipient").unwrap() += 10;
        *tx.output_map.get_mut(&wallet.address()).unwrap() -= 10;

        assert!(matches!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::InvalidSignature { .. })
        ));
    }

    #[test]
    fn signature_does_not_carry_over_to_shifted_keys() {
        // Recipient chosen so that its name plus an amount could be read as
        // a shorter key followed by the payer's address.
        let wallet = Wallet::with_balance(1_000);
        let recipient = "\0\x28\0\0\0\0\0\0\0";
        let tx = wallet.create_transaction(recipient, 40).unwrap();
        assert!(tx.is_valid());

        let mut forged = tx.clone();
        forged.output_map = OutputMap::from([
            (String::new(), 40),
            (format!("{}{}", recipient, wallet.address()), 960),
        ]);

        assert_eq!(output_total(&forged.output_map), 1_000);
        assert!(matches!(
            validate_transaction(&forged).unwrap(),
            Verdict::Rejected(Rejection::InvalidSignature { .. })
        ));
        assert!(!forged.is_valid());
    }

    #[test]
    fn balance_check_runs_before_signature_check() {
        let (mut tx, _) = valid_tx();
        tx.output_map.insert("recipient".to_string(), 60);
        let TransactionInput::Signed(claim) = &mut tx.input else {
            unreachable!()
        };
        claim.signature = TallyKeypair::generate().sign(b"garbage");

        assert!(matches!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::BalanceMismatch { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_payer_address() {
        let (mut tx, _) = valid_tx();
        let TransactionInput::Signed(claim) = &mut tx.input else {
            unreachable!()
        };
        claim.address = "not-a-key".to_string();

        assert!(matches!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::InvalidSignature { .. })
        ));
    }

    #[test]
    fn empty_outputs_is_a_fault() {
        let (mut tx, _) = valid_tx();
        tx.output_map.clear();
        assert!(matches!(
            validate_transaction(&tx),
            Err(TransactionError::EmptyOutputs)
        ));
        assert!(!tx.is_valid());
    }

    #[test]
    fn reward_transaction_is_accepted() {
        let tx = Transaction::reward_to("miner");
        assert_eq!(validate_transaction(&tx).unwrap(), Verdict::Accepted);
        // The sentinel claims 0 while 50 is paid out: exempt from conservation.
        assert_ne!(output_total(&tx.output_map), u128::from(tx.input.amount()));
    }

    #[test]
    fn reward_with_inflated_amount_is_rejected() {
        let mut tx = Transaction::reward_to("miner");
        tx.output_map.insert("miner".to_string(), MINING_REWARD * 2);

        assert_eq!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::RewardAmount {
                expected: MINING_REWARD,
                actual: MINING_REWARD * 2,
            })
        );
    }

    #[test]
    fn reward_with_extra_output_is_rejected() {
        let mut tx = Transaction::reward_to("miner");
        tx.output_map.insert("accomplice".to_string(), 1);

        assert_eq!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::RewardShape { outputs: 2 })
        );
    }

    #[test]
    fn reward_with_forged_sentinel_is_rejected() {
        let mut tx = Transaction::reward_to("miner");
        tx.input = TransactionInput::Reward(RewardInput {
            address: Cow::Owned("some-payer".to_string()),
            amount: 0,
        });

        assert!(matches!(
            validate_transaction(&tx).unwrap(),
            Verdict::Rejected(Rejection::ForgedRewardInput { .. })
        ));

        tx.input = TransactionInput::Reward(RewardInput {
            address: Cow::Borrowed(REWARD_INPUT_ADDRESS),
            amount: 1,
        });
        assert!(!tx.is_valid());
    }

    #[test]
    fn validate_json_accepts_round_tripped_transaction() {
        let (tx, _) = valid_tx();
        let json = tx.to_json().unwrap();
        assert!(validate_json(&json).unwrap().is_accepted());
    }

    #[test]
    fn validate_json_distinguishes_malformed_from_rejected() {
        assert!(matches!(
            validate_json("{\"outputMap\":{}}"),
            Err(TransactionError::Malformed(_))
        ));

        let (mut tx, _) = valid_tx();
        tx.output_map.insert("recipient".to_string(), 1);
        let verdict = validate_json(&tx.to_json().unwrap()).unwrap();
        assert!(verdict.rejection().is_some());
        assert!(verdict.to_string().starts_with("rejected: invalid transaction from"));
    }

    #[test]
    fn validate_json_bad_signature_hex_is_malformed() {
        let (tx, _) = valid_tx();
        let mut value = serde_json::to_value(&tx).unwrap();
        value["inputMap"]["signature"] = serde_json::Value::String("zz".to_string());

        assert!(matches!(
            validate_json(&value.to_string()),
            Err(TransactionError::Malformed(_))
        ));
    }
}
