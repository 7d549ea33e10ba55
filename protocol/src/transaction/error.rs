//! Fault types for transaction construction, amendment and validation.
//!
//! A [`TransactionError`] means the operation could not be carried out at
//! all: the payer cannot cover an amendment, the signer failed, or the
//! transaction is structurally malformed. A well-formed transaction that
//! merely fails the acceptance rules is *not* an error; see
//! [`super::verification::Verdict`].

use thiserror::Error;

/// Failure reported by the payer's signing capability.
#[derive(Debug, Error)]
#[error("signing failed: {reason}")]
pub struct SigningError {
    pub reason: String,
}

impl SigningError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that stop a transaction operation outright.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The payer's remaining allocation cannot cover the requested amount.
    #[error("amount exceeds balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Reward transactions have no payer and cannot be amended.
    #[error("transaction {id} is a reward transaction and cannot be amended")]
    NotAmendable { id: String },

    /// Crediting a recipient would overflow its entry.
    #[error("amount overflow crediting {recipient}")]
    AmountOverflow { recipient: String },

    /// The output map has no entries. Nothing can be conserved or signed.
    #[error("transaction has no outputs")]
    EmptyOutputs,

    /// The payer's signing capability failed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The transaction could not be decoded (missing fields, bad signature
    /// encoding, unknown input type, ...).
    #[error("malformed transaction: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for TransactionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_message() {
        let err = TransactionError::InsufficientBalance {
            requested: 1_001,
            available: 1_000,
        };
        assert_eq!(
            err.to_string(),
            "amount exceeds balance: requested 1001, available 1000"
        );
    }

    #[test]
    fn signing_error_is_transparent() {
        let err: TransactionError = SigningError::new("hsm offline").into();
        assert_eq!(err.to_string(), "signing failed: hsm offline");
    }

    #[test]
    fn json_errors_become_malformed() {
        let err: TransactionError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, TransactionError::Malformed(_)));
    }
}
