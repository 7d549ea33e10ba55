//! # Digital Signatures
//!
//! Ed25519 signing and verification. Every signed input claim is checked
//! through [`verify_signature`], which is the only verification entry point
//! validators need: it takes the payer's address as it appears on the wire,
//! not a typed key.
//!
//! ## Strictness
//!
//! Addresses that do not decode to a valid Ed25519 point simply fail
//! verification. A bad address is a property of the transaction being
//! checked, not a fault in the checker.

use super::keys::{TallyKeypair, TallyPublicKey, TallySignature};

/// Sign a message using a Tally keypair.
///
/// # Example
///
/// ```
/// use tally_protocol::crypto::{TallyKeypair, sign, verify};
///
/// let keypair = TallyKeypair::generate();
/// let signature = sign(&keypair, b"send 100 to alice");
///
/// assert!(verify(&keypair.public_key(), b"send 100 to alice", &signature));
/// ```
pub fn sign(keypair: &TallyKeypair, message: &[u8]) -> TallySignature {
    keypair.sign(message)
}

/// Verify an Ed25519 signature against a typed public key.
pub fn verify(public_key: &TallyPublicKey, message: &[u8], signature: &TallySignature) -> bool {
    public_key.verify(message, signature)
}

/// Verify a signature against an address (hex-encoded public key).
///
/// Returns `false` when the address is not a well-formed public key, when
/// the signature was produced by another key, or when `message` differs
/// from what was signed. We don't distinguish between those; a detailed
/// error oracle helps nobody but attackers.
pub fn verify_signature(address: &str, message: &[u8], signature: &TallySignature) -> bool {
    match TallyPublicKey::from_hex(address) {
        Ok(public_key) => verify(&public_key, message, signature),
        Err(_) => false,
    }
}
