//! # Tally Constants
//!
//! Economic parameters, the reward sentinel and key sizes.
//!
//! These are plain `const` items: fixed at compile time, identical in every
//! process, and impossible to mutate at runtime.

use std::borrow::Cow;

use crate::transaction::types::RewardInput;

/// Version of the transaction wire format.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Keys and Signatures
// ---------------------------------------------------------------------------

/// Ed25519 for every signature in the system.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Bytes in a secret key file, before hex encoding.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Bytes behind an address, before hex encoding.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Bytes in an input claim signature, before hex encoding.
pub const SIGNATURE_LENGTH: usize = 64;

/// Domain tag prefixed to the canonical output-map bytes before signing.
pub const OUTPUT_MAP_DOMAIN: &str = "tally-output-map";

// ---------------------------------------------------------------------------
// Economics
// ---------------------------------------------------------------------------

/// Balance a freshly generated wallet starts with.
pub const STARTING_BALANCE: u64 = 1_000;

/// Amount credited to the beneficiary of a reward transaction. This is the
/// only way value enters the system.
pub const MINING_REWARD: u64 = 50;

/// Address carried by the reward sentinel. Not a valid hex public key, so
/// it can never collide with a real payer.
pub const REWARD_INPUT_ADDRESS: &str = "*authorized-reward*";

/// The fixed, unsigned input used verbatim by every reward transaction.
pub const REWARD_INPUT: RewardInput = RewardInput {
    address: Cow::Borrowed(REWARD_INPUT_ADDRESS),
    amount: 0,
};
