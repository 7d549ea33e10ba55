//! # Payer Keys and Addresses
//!
//! Every payer holds one Ed25519 keypair. Its public key, hex-encoded, is
//! the payer's address: the string that appears as a key in output maps
//! and as `address` in signed input claims. There is no other address
//! format.
//!
//! ## Why hex public keys as addresses?
//!
//! - Anyone holding a transaction can verify it. The address *is* the
//!   verifying key, so there is no registry to consult and nothing to look up.
//! - Hex is what goes in JSON object keys without escaping surprises, and
//!   it round-trips byte for byte.
//! - No checksum, no version byte. Tally addresses are never typed by hand;
//!   they come out of `tally keygen` and get pasted.
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures. Re-signing the same output map yields the
//!   same bytes, which keeps amendment tests honest.
//! - 32-byte keys, 64-byte signatures. Small enough to live in every input.
//!
//! ## Security considerations
//!
//! - Secret keys come from `OsRng` or an explicit 32-byte seed.
//! - `SigningKey` wipes itself on drop.
//! - Secret bytes never reach a log line or a `Debug` string. Key files are
//!   the only place they are written, and `tally keygen` creates those 0600.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{SIGNATURE_LENGTH, SIGNING_KEY_LENGTH, VERIFYING_KEY_LENGTH};

/// Decoding failures for key files, addresses and signature strings.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not hex")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid signature encoding: expected {} hex-encoded bytes", SIGNATURE_LENGTH)]
    InvalidSignature,
}

/// The signing half of a payer identity.
///
/// Not serde-serializable. Key files go through
/// [`secret_key_bytes`](Self::secret_key_bytes) and
/// [`from_hex`](Self::from_hex).
///
/// # Examples
///
/// ```
/// use tally_protocol::crypto::keys::TallyKeypair;
///
/// let kp = TallyKeypair::generate();
/// let sig = kp.sign(b"send 100 to alice");
/// assert!(kp.public_key().verify(b"send 100 to alice", &sig));
/// ```
pub struct TallyKeypair {
    signing_key: SigningKey,
}

/// The public half of a keypair, safe to share with the world.
///
/// Travels only in its address form; see [`to_hex`](Self::to_hex) and
/// [`from_hex`](Self::from_hex).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TallyPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature. Always 64 bytes; serialized as a hex string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TallySignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl TallyKeypair {
    /// New random keypair from `OsRng`.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Keypair derived from a 32-byte seed. Same seed, same address.
    pub fn from_seed(seed: &[u8; SIGNING_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Loads a hex secret key as written by `tally keygen`. Surrounding
    /// whitespace is ignored.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SIGNING_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> TallyPublicKey {
        TallyPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// The address derived from this keypair (hex public key).
    pub fn address(&self) -> String {
        self.public_key().to_hex()
    }

    /// Sign a message. Deterministic per RFC 8032: the same (key, message)
    /// pair always produces the same signature.
    pub fn sign(&self, message: &[u8]) -> TallySignature {
        TallySignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// Raw secret key bytes, for writing key files.
    pub fn secret_key_bytes(&self) -> [u8; SIGNING_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl Clone for TallyKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for TallyKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TallyKeypair(pub={})", self.public_key().to_hex())
    }
}

// ---------------------------------------------------------------------------
// TallyPublicKey
// ---------------------------------------------------------------------------

impl TallyPublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// `true` iff `signature` is this key's signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &TallySignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// The address form of this key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse a hex-encoded public key, checking that it is a valid point.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidPublicKey)?;
        let bytes: [u8; VERIFYING_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }
}

impl Hash for TallyPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for TallyPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TallyPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TallyPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// TallySignature
// ---------------------------------------------------------------------------

impl TallySignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Returns the hex-encoded signature string. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses the 128-character hex form used on the wire.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s).map_err(|_| KeyError::InvalidSignature)?;
        let bytes: [u8; SIGNATURE_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self { bytes })
    }
}

impl Serialize for TallySignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TallySignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TallySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TallySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "TallySignature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
