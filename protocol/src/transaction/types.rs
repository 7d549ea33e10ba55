//! Core type definitions for Tally transactions.
//!
//! An output map says where value goes; an input says who vouches for it.
//! Ordinary transactions carry a signed [`InputClaim`]; reward transactions
//! carry the fixed [`RewardInput`] sentinel. The two are variants of
//! [`TransactionInput`] so that validators dispatch on the type, never on
//! the contents of an address string.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::crypto::keys::TallySignature;

// ---------------------------------------------------------------------------
// OutputMap
// ---------------------------------------------------------------------------

/// Distribution of an amount across recipients, payer remainder included.
///
/// Keyed by address. A `BTreeMap` so that iteration (and therefore the
/// signed byte representation) is canonical regardless of the order in
/// which entries were inserted.
pub type OutputMap = BTreeMap<String, u64>;

/// Sum of every output. Computed in `u128` so that a hostile map whose
/// values would overflow `u64` still produces an exact total.
pub fn output_total(outputs: &OutputMap) -> u128 {
    outputs.values().map(|&v| u128::from(v)).sum()
}

// ---------------------------------------------------------------------------
// InputClaim
// ---------------------------------------------------------------------------

/// The signed commitment a payer makes over an output map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputClaim {
    /// Unix timestamp in milliseconds when the claim was (re)signed.
    pub timestamp: u64,

    /// The payer's balance at signing time. Ordinary transactions must have
    /// outputs summing to exactly this.
    pub amount: u64,

    /// The payer's address (hex-encoded Ed25519 public key).
    pub address: String,

    /// Signature over the canonical bytes of the output map.
    pub signature: TallySignature,
}

// ---------------------------------------------------------------------------
// RewardInput
// ---------------------------------------------------------------------------

/// The unsigned system sentinel used as input by reward transactions.
///
/// There is exactly one legitimate value, [`crate::config::REWARD_INPUT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInput {
    pub address: Cow<'static, str>,
    pub amount: u64,
}

// ---------------------------------------------------------------------------
// TransactionInput
// ---------------------------------------------------------------------------

/// Who vouches for a transaction's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionInput {
    /// A payer-signed claim. Subject to conservation and signature checks.
    Signed(InputClaim),
    /// System-issued value. Subject to the reward rules instead.
    Reward(RewardInput),
}

impl TransactionInput {
    /// Address the input claims to come from.
    pub fn address(&self) -> &str {
        match self {
            Self::Signed(claim) => &claim.address,
            Self::Reward(reward) => &reward.address,
        }
    }

    /// Amount stated by the input.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Signed(claim) => claim.amount,
            Self::Reward(reward) => reward.amount,
        }
    }

    /// The signed claim, if this is an ordinary input.
    pub fn as_claim(&self) -> Option<&InputClaim> {
        match self {
            Self::Signed(claim) => Some(claim),
            Self::Reward(_) => None,
        }
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, Self::Reward(_))
    }
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(claim) => write!(f, "signed({}, {})", claim.address, claim.amount),
            Self::Reward(reward) => write!(f, "reward({})", reward.address),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
