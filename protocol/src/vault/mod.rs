//! # Vault Module: Wallets
//!
//! The vault is where keys and balances live. A [`Wallet`] is the concrete
//! payer behind most transactions: it owns an Ed25519 keypair, knows its
//! balance, and signs output maps on request.
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in the smallest unit.** No floating point.
//! 2. **Keys never leave the wallet by accident.** `Debug` prints the
//!    address only; there is no `Serialize` impl.

pub mod wallet;

pub use wallet::{Wallet, WalletError};
