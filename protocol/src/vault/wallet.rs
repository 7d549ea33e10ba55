//! # Wallet
//!
//! A [`Wallet`] binds a keypair to a spendable balance and implements
//! [`PayerIdentity`], so it can create, amend and sign transactions.
//!
//! The wallet is also where the overspend policy for *new* transactions
//! lives: [`Wallet::create_transaction`] refuses to send more than the
//! balance. Amendments are checked by the transaction itself against the
//! remaining allocation.
//!
//! ## Why is the balance just a number?
//!
//! Tally has no ledger of its own. Whoever owns the chain computes balances
//! and hands them to the wallet via [`Wallet::set_balance`]. The wallet
//! only promises to sign claims that match what it was told, and the claim
//! records that figure so validators can hold it to it.
//!
//! ## Why does signing never fail here?
//!
//! The key is in memory. [`PayerIdentity::sign`] is fallible for payers
//! whose key lives elsewhere (an HSM, a remote signer); a wallet just
//! returns `Ok`.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::config::STARTING_BALANCE;
use crate::crypto::keys::{TallyKeypair, TallyPublicKey, TallySignature};
use crate::transaction::error::{SigningError, TransactionError};
use crate::transaction::signing::PayerIdentity;
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The requested amount is larger than the wallet's balance.
    #[error("amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: u64, balance: u64 },

    /// Building or amending the transaction failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// A keypair plus the balance it controls.
#[derive(Clone)]
pub struct Wallet {
    keypair: TallyKeypair,
    balance: u64,
}

impl Wallet {
    /// Creates a wallet with a fresh keypair and [`STARTING_BALANCE`].
    pub fn new() -> Self {
        Self::with_balance(STARTING_BALANCE)
    }

    /// Creates a wallet with a fresh keypair and the given balance.
    pub fn with_balance(balance: u64) -> Self {
        Self::from_keypair(TallyKeypair::generate(), balance)
    }

    /// Wraps an existing keypair, e.g. one loaded from a key file.
    pub fn from_keypair(keypair: TallyKeypair, balance: u64) -> Self {
        Self { keypair, balance }
    }

    /// The wallet's address: its hex-encoded public key.
    pub fn address(&self) -> String {
        self.keypair.address()
    }

    pub fn public_key(&self) -> TallyPublicKey {
        self.keypair.public_key()
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Replaces the balance, e.g. after the ledger recomputes it.
    pub fn set_balance(&mut self, balance: u64) {
        self.balance = balance;
    }

    /// Signs raw bytes with the wallet key.
    pub fn sign_data(&self, data: &[u8]) -> TallySignature {
        self.keypair.sign(data)
    }

    /// Creates a signed transaction sending `amount` to `recipient`.
    ///
    /// # Errors
    ///
    /// [`WalletError::AmountExceedsBalance`] if `amount > balance`.
    pub fn create_transaction(
        &self,
        recipient: &str,
        amount: u64,
    ) -> Result<Transaction, WalletError> {
        if amount > self.balance {
            warn!(
                payer = %self.address(),
                amount,
                balance = self.balance,
                "amount exceeds balance"
            );
            return Err(WalletError::AmountExceedsBalance {
                amount,
                balance: self.balance,
            });
        }
        Ok(Transaction::new(self, recipient, amount)?)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl PayerIdentity for Wallet {
    fn address(&self) -> String {
        Wallet::address(self)
    }

    fn balance(&self) -> u64 {
        self.balance
    }

    fn sign(&self, data: &[u8]) -> Result<TallySignature, SigningError> {
        Ok(self.sign_data(data))
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("balance", &self.balance)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
