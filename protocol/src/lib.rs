// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Tally Protocol Core Library
//!
//! Tally models a single unit of value transfer: a transaction that
//! redistributes a payer's balance across recipients, is signed by that
//! payer, and can be checked by anyone holding nothing but the transaction.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants: rewards, starting balance, sentinel.
//! - **crypto**: Ed25519 keys, signatures and address-based verification.
//! - **transaction**: Creation, amendment, validation, and the pending pool.
//! - **vault**: Wallets: a keypair plus the balance it may spend.
//!
//! ## Design Philosophy
//!
//! 1. A transaction is never observable half-built or half-amended.
//! 2. Rejection is an answer, not an error. Faults are errors.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod transaction;
pub mod vault;
