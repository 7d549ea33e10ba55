//! Pool of pending transactions.
//!
//! Transactions are plain data with no locking of their own, so two callers
//! amending the same one would race. The pool is where that race is
//! settled: every read-modify-write of a pooled transaction happens under
//! its write lock, and callers only ever get clones back.
//!
//! A payer has at most one pending transaction. Sending again while one is
//! pending amends it instead of creating a second, which is what makes the
//! "remaining allocation" check in [`Transaction::update`] meaningful.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::builder::Transaction;
use super::verification::Verdict;
use crate::vault::{Wallet, WalletError};

/// A thread-safe pool of pending transactions keyed by id.
#[derive(Default)]
pub struct TransactionPool {
    transactions: RwLock<HashMap<Uuid, Transaction>>,
}

impl fmt::Debug for TransactionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionPool")
            .field("size", &self.len())
            .finish()
    }
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a transaction, replacing any pooled one with the same id.
    pub fn set_transaction(&self, tx: Transaction) {
        debug!(id = %tx.id, payer = tx.payer(), "transaction pooled");
        self.transactions.write().insert(tx.id, tx);
    }

    /// The pending ordinary transaction paid by `address`, if any.
    pub fn existing_transaction(&self, address: &str) -> Option<Transaction> {
        self.transactions
            .read()
            .values()
            .find(|tx| is_paid_by(tx, address))
            .cloned()
    }

    pub fn get(&self, id: &Uuid) -> Option<Transaction> {
        self.transactions.read().get(id).cloned()
    }

    /// Sends `amount` from `wallet` to `recipient`.
    ///
    /// Amends the wallet's pending transaction if there is one, otherwise
    /// creates a new one. The pooled copy is updated atomically; on error
    /// the pool is unchanged.
    ///
    /// # Errors
    ///
    /// Whatever [`Wallet::create_transaction`] or [`Transaction::update`]
    /// report; an overspend surfaces as an insufficient-balance error.
    pub fn transact(
        &self,
        wallet: &Wallet,
        recipient: &str,
        amount: u64,
    ) -> Result<Transaction, WalletError> {
        let address = wallet.address();
        let mut transactions = self.transactions.write();

        let pending = transactions
            .values_mut()
            .find(|tx| is_paid_by(tx, &address));

        let tx = match pending {
            Some(tx) => {
                tx.update(wallet, recipient, amount)?;
                tx.clone()
            }
            None => {
                let tx = wallet.create_transaction(recipient, amount)?;
                transactions.insert(tx.id, tx.clone());
                tx
            }
        };

        debug!(id = %tx.id, payer = %address, recipient, amount, "pool transact");
        Ok(tx)
    }

    /// Snapshot of every pooled transaction that validation accepts.
    ///
    /// Rejected and malformed transactions are skipped, not removed.
    pub fn valid_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .read()
            .values()
            .filter(|tx| match tx.validate() {
                Ok(Verdict::Accepted) => true,
                Ok(Verdict::Rejected(_)) => false,
                Err(e) => {
                    warn!(id = %tx.id, error = %e, "skipping faulty pooled transaction");
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// Drops every pooled transaction, e.g. once they are committed.
    pub fn clear(&self) {
        self.transactions.write().clear();
    }

    pub fn len(&self) -> usize {
        self.transactions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.read().is_empty()
    }
}

fn is_paid_by(tx: &Transaction, address: &str) -> bool {
    tx.input
        .as_claim()
        .is_some_and(|claim| claim.address == address)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::error::TransactionError;
    use std::sync::Arc;

    #[test]
    fn set_and_get_by_id() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let tx = wallet.create_transaction("r", 10).unwrap();

        pool.set_transaction(tx.clone());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&tx.id), Some(tx));
    }

    #[test]
    fn set_replaces_same_id() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let mut tx = wallet.create_transaction("r", 10).unwrap();
        pool.set_transaction(tx.clone());

        tx.update(&wallet, "s", 5).unwrap();
        pool.set_transaction(tx.clone());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&tx.id).unwrap().output_map["s"], 5);
    }

    #[test]
    fn existing_transaction_by_payer() {
        let pool = TransactionPool::new();
        let wallet = Wallet::new();
        let tx = wallet.create_transaction("r", 10).unwrap();
        pool.set_transaction(tx.clone());
        pool.set_transaction(Transaction::reward(&wallet));

        assert_eq!(pool.existing_transaction(&wallet.address()), Some(tx));
        assert_eq!(pool.existing_transaction("nobody"), None);
    }

    #[test]
    fn transact_creates_then_amends() {
        let pool = TransactionPool::new();
        let wallet = Wallet::with_balance(100);

        let first = pool.transact(&wallet, "a", 30).unwrap();
        let second = pool.transact(&wallet, "a", 20).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(pool.len(), 1);
        assert_eq!(second.output_map["a"], 50);
        assert_eq!(second.output_map[&wallet.address()], 50);
        assert!(second.is_valid());
    }

    #[test]
    fn transact_overspend_leaves_pool_unchanged() {
        let pool = TransactionPool::new();
        let wallet = Wallet::with_balance(100);
        pool.transact(&wallet, "a", 90).unwrap();
        let before = pool.existing_transaction(&wallet.address()).unwrap();

        let err = pool.transact(&wallet, "b", 20).unwrap_err();
        assert!(matches!(
            err,
            WalletError::Transaction(TransactionError::InsufficientBalance { .. })
        ));
        assert_eq!(pool.existing_transaction(&wallet.address()), Some(before));
    }

    #[test]
    fn valid_transactions_filters_invalid() {
        let pool = TransactionPool::new();
        let alice = Wallet::new();
        let bob = Wallet::new();

        let good = alice.create_transaction("r", 10).unwrap();
        let mut tampered = bob.create_transaction("r", 10).unwrap();
        tampered.output_map.insert("r".to_string(), 11);
        let reward = Transaction::reward(&alice);

        pool.set_transaction(good.clone());
        pool.set_transaction(tampered);
        pool.set_transaction(reward.clone());

        let mut valid: Vec<Uuid> = pool.valid_transactions().into_iter().map(|t| t.id).collect();
        valid.sort();
        let mut expected = vec![good.id, reward.id];
        expected.sort();
        assert_eq!(valid, expected);
    }

    #[test]
    fn clear_empties_pool() {
        let pool = TransactionPool::new();
        pool.set_transaction(Transaction::reward_to("miner"));
        assert!(!pool.is_empty());
        pool.clear();
        assert!(pool.is_empty());
    }

    #[test]
    fn concurrent_transacts_do_not_lose_updates() {
        let pool = Arc::new(TransactionPool::new());
        let wallet = Arc::new(Wallet::with_balance(1_000));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                let wallet = Arc::clone(&wallet);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        pool.transact(&wallet, &format!("r{}", i), 10).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let tx = pool.existing_transaction(&wallet.address()).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(tx.output_map[&wallet.address()], 1_000 - 8 * 5 * 10);
        assert!(tx.is_valid());
    }
}
