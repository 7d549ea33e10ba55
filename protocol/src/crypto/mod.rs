//! # Cryptographic Primitives for Tally
//!
//! Everything signature-related in the protocol flows through here:
//!
//! - **keys**: Ed25519 keypairs, public keys (addresses) and signatures.
//! - **signatures**: signing and verification, including the
//!   address-based check validators run against every input claim.
//!
//! Everything here is a thin, type-safe wrapper around `ed25519-dalek`.

pub mod keys;
pub mod signatures;

pub use keys::{KeyError, TallyKeypair, TallyPublicKey, TallySignature};
pub use signatures::{sign, verify, verify_signature};
