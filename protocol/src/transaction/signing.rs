//! # Output Map Signing
//!
//! The payer never signs a transaction as a whole, only its output map,
//! serialized by [`signable_bytes`]. Anything that can produce an address,
//! report a balance and sign bytes can act as a payer; see
//! [`PayerIdentity`]. The wallet in [`crate::vault`] is the usual one, but
//! a remote signer or an HSM wrapper would do just as well.
//!
//! ## Why not sign the JSON?
//!
//! JSON has too many spellings of the same object: key order, whitespace,
//! escapes, number formats. Two honest serializers disagree and the
//! signature breaks. The bytes signed here are built by hand, and there is
//! exactly one way to build them for a given map.
//!
//! ## Why length prefixes?
//!
//! Addresses are whatever string the sender typed, NUL bytes and all. With
//! a separator instead of a length, a recipient named `"\0(\0\0\0\0\0\0\0"`
//! makes the byte string readable as a *different* map with the same total,
//! and the payer's signature would vouch for both. Each address carries its
//! length, so it can't.
//!
//! ## What is not signed
//!
//! The id, the timestamp and the claimed amount. Validators check the
//! amount against the outputs instead, and the other two are bookkeeping.

use chrono::Utc;

use super::error::SigningError;
use super::types::{InputClaim, OutputMap};
use crate::config::OUTPUT_MAP_DOMAIN;
use crate::crypto::keys::TallySignature;

/// The capabilities a paying party must expose.
pub trait PayerIdentity {
    /// Public identifier; appears as the payer's key in output maps.
    fn address(&self) -> String;

    /// Spendable balance right now.
    fn balance(&self) -> u64;

    /// Sign arbitrary bytes. Failure here is a fault, never a rejection.
    fn sign(&self, data: &[u8]) -> Result<TallySignature, SigningError>;
}

impl<T: PayerIdentity + ?Sized> PayerIdentity for &T {
    fn address(&self) -> String {
        (**self).address()
    }

    fn balance(&self) -> u64 {
        (**self).balance()
    }

    fn sign(&self, data: &[u8]) -> Result<TallySignature, SigningError> {
        (**self).sign(data)
    }
}

/// Canonical byte representation of an output map.
///
/// Layout: domain tag, `0x00`, entry count (u32 LE), then per entry in key
/// order: address length (u32 LE), address bytes, amount (u64 LE).
///
/// Addresses are arbitrary strings on the wire, NUL bytes included, so each
/// one carries its length. Every map encodes to exactly one byte string and
/// no byte string decodes to two maps.
pub fn signable_bytes(outputs: &OutputMap) -> Vec<u8> {
    let mut buf = Vec::with_capacity(OUTPUT_MAP_DOMAIN.len() + 5 + outputs.len() * 80);

    buf.extend_from_slice(OUTPUT_MAP_DOMAIN.as_bytes());
    buf.push(0x00);
    buf.extend_from_slice(&(outputs.len() as u32).to_le_bytes());

    for (address, amount) in outputs {
        buf.extend_from_slice(&(address.len() as u32).to_le_bytes());
        buf.extend_from_slice(address.as_bytes());
        buf.extend_from_slice(&amount.to_le_bytes());
    }

    buf
}

/// Produce a fresh input claim committing `payer` to `outputs`.
///
/// Timestamp is now; amount is the payer's current balance.
pub fn create_input_claim<P: PayerIdentity + ?Sized>(
    payer: &P,
    outputs: &OutputMap,
) -> Result<InputClaim, SigningError> {
    let signature = payer.sign(&signable_bytes(outputs))?;
    Ok(InputClaim {
        timestamp: Utc::now().timestamp_millis() as u64,
        amount: payer.balance(),
        address: payer.address(),
        signature,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
