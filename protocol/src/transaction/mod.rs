//! # Transaction Module
//!
//! Construction, amendment, signing and validation of Tally transactions.
//! A transaction moves value from one payer to any number of recipients and
//! carries the payer's signature over exactly where that value goes.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        OutputMap, InputClaim, RewardInput, TransactionInput
//! signing.rs      PayerIdentity trait, canonical bytes, input claims
//! builder.rs      Transaction: new, from_parts, update, reward
//! verification.rs validate_transaction, Verdict, Rejection
//! error.rs        TransactionError faults
//! pool.rs         TransactionPool, serialised create-or-amend
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Create**: [`Transaction::new`] (or a wallet) derives the outputs
//!    and signs them.
//! 2. **Amend**: [`Transaction::update`] credits more recipients out of
//!    the payer's remainder and re-signs, atomically.
//! 3. **Verify**: anyone runs [`validate_transaction`] before inclusion.
//!
//! ## Design Decisions
//!
//! - Amounts are `u64` in the smallest unit. No floating point.
//! - The output map is a `BTreeMap`, so its signed bytes are canonical.
//! - Reward transactions are a separate input variant with their own
//!   validation rules, not a special address inside an ordinary input.

pub mod builder;
pub mod error;
pub mod pool;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::Transaction;
pub use error::{SigningError, TransactionError};
pub use pool::TransactionPool;
pub use signing::{signable_bytes, PayerIdentity};
pub use types::{InputClaim, OutputMap, RewardInput, TransactionInput};
pub use verification::{validate_json, validate_transaction, Rejection, Verdict};
