//! Transaction construction and amendment.
//!
//! A [`Transaction`] is always complete: every constructor and every
//! successful [`Transaction::update`] returns with an input that commits to
//! the current output map. Amendment builds the new map and the new claim
//! on the side and swaps them in together, so a failed call leaves the
//! transaction exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::error::TransactionError;
use super::signing::{create_input_claim, PayerIdentity};
use super::types::{OutputMap, TransactionInput};
use super::verification::{validate_transaction, Verdict};
use crate::config::{MINING_REWARD, REWARD_INPUT};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A single transfer of value from one payer to one or more recipients.
///
/// The `id` is a random UUID assigned at construction. It identifies the
/// transaction to pools and ledgers but plays no part in validation.
///
/// # Wire format
///
/// ```json
/// { "id": "…", "outputMap": { "<addr>": 40, "<payer>": 960 },
///   "inputMap": { "type": "signed", "timestamp": 0, "amount": 1000,
///                 "address": "<payer>", "signature": "<hex>" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, immutable after construction.
    pub id: Uuid,

    /// Recipient address -> amount, payer remainder included.
    #[serde(rename = "outputMap")]
    pub output_map: OutputMap,

    /// The signed claim (or reward sentinel) backing the outputs.
    #[serde(rename = "inputMap")]
    pub input: TransactionInput,
}

impl Transaction {
    /// Creates and signs a transfer of `amount` from `payer` to `recipient`.
    ///
    /// The output map is `{ recipient: amount, payer: balance - amount }`.
    /// No policy check is made against the payer's balance here (that is the
    /// wallet's job), but since amounts are unsigned an `amount` larger than
    /// the balance cannot be represented and fails with
    /// [`TransactionError::InsufficientBalance`].
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InsufficientBalance`] if the remainder would be negative.
    /// - [`TransactionError::Signing`] if the payer cannot sign.
    pub fn new<P: PayerIdentity + ?Sized>(
        payer: &P,
        recipient: &str,
        amount: u64,
    ) -> Result<Self, TransactionError> {
        let balance = payer.balance();
        let remainder = balance
            .checked_sub(amount)
            .ok_or(TransactionError::InsufficientBalance {
                requested: amount,
                available: balance,
            })?;

        let payer_address = payer.address();
        let mut output_map = OutputMap::new();
        output_map.insert(recipient.to_string(), amount);
        // Inserted second so a self-transfer keeps the remainder.
        output_map.insert(payer_address.clone(), remainder);

        let claim = create_input_claim(payer, &output_map)?;
        let tx = Self::from_parts(output_map, TransactionInput::Signed(claim));

        debug!(
            id = %tx.id,
            payer = %payer_address,
            recipient,
            amount,
            "transaction created"
        );
        Ok(tx)
    }

    /// Wraps pre-built outputs and input under a fresh id.
    ///
    /// Used to reconstruct a transaction received from elsewhere and to
    /// build reward transactions. Nothing is checked; run
    /// [`Transaction::validate`] before trusting the result.
    pub fn from_parts(output_map: OutputMap, input: TransactionInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            output_map,
            input,
        }
    }

    /// Builds the reward transaction for `beneficiary`.
    pub fn reward<P: PayerIdentity + ?Sized>(beneficiary: &P) -> Self {
        Self::reward_to(&beneficiary.address())
    }

    /// Builds the reward transaction crediting `address` with
    /// [`MINING_REWARD`] against the fixed [`REWARD_INPUT`].
    pub fn reward_to(address: &str) -> Self {
        let mut output_map = OutputMap::new();
        output_map.insert(address.to_string(), MINING_REWARD);
        let tx = Self::from_parts(output_map, TransactionInput::Reward(REWARD_INPUT));

        debug!(id = %tx.id, beneficiary = address, reward = MINING_REWARD, "reward issued");
        tx
    }

    /// Adds `amount` for `recipient`, paid out of the payer's remaining
    /// allocation, and re-signs.
    ///
    /// The payer is trusted to be the one who created the transaction; its
    /// address is not compared against the stored input. An existing
    /// recipient entry is increased, never overwritten.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InsufficientBalance`] if `amount` exceeds the
    ///   payer's current entry in the output map.
    /// - [`TransactionError::NotAmendable`] on reward transactions.
    /// - [`TransactionError::AmountOverflow`] if the recipient entry would overflow.
    /// - [`TransactionError::Signing`] if the payer cannot sign.
    ///
    /// On error the transaction is left untouched.
    pub fn update<P: PayerIdentity + ?Sized>(
        &mut self,
        payer: &P,
        recipient: &str,
        amount: u64,
    ) -> Result<(), TransactionError> {
        if self.input.is_reward() {
            return Err(TransactionError::NotAmendable {
                id: self.id.to_string(),
            });
        }

        let payer_address = payer.address();
        let available = self.output_map.get(&payer_address).copied().unwrap_or(0);
        if amount > available {
            return Err(TransactionError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let mut output_map = self.output_map.clone();
        let credited = output_map
            .get(recipient)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| TransactionError::AmountOverflow {
                recipient: recipient.to_string(),
            })?;
        output_map.insert(recipient.to_string(), credited);

        // Re-read rather than reuse `available`: recipient may be the payer.
        let remaining = output_map.get(&payer_address).copied().unwrap_or(0) - amount;
        output_map.insert(payer_address.clone(), remaining);

        let claim = create_input_claim(payer, &output_map)?;

        self.output_map = output_map;
        self.input = TransactionInput::Signed(claim);

        debug!(
            id = %self.id,
            payer = %payer_address,
            recipient,
            amount,
            remaining,
            "transaction amended"
        );
        Ok(())
    }

    /// Runs the acceptance rules; see [`validate_transaction`].
    pub fn validate(&self) -> Result<Verdict, TransactionError> {
        validate_transaction(self)
    }

    /// `true` only if the transaction is well-formed and accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self.validate(), Ok(Verdict::Accepted))
    }

    /// Decodes a transaction, keeping its original id.
    ///
    /// # Errors
    ///
    /// [`TransactionError::Malformed`] for anything that is not a complete
    /// transaction: missing fields, unknown input type, bad signature hex.
    pub fn from_json(raw: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encodes the transaction as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Address of the payer, or of the reward sentinel.
    pub fn payer(&self) -> &str {
        self.input.address()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
