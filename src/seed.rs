//! Deterministic seeding utilities
//!
//! Every pseudo-random decision in the engine (day jitter, minute offsets,
//! commenter picks, thread topology) goes through [`stable_hash`], so the same
//! seed string always yields the same integer across runs and platforms.

use sha2::{Digest, Sha256};

/// Number of leading hex digits of the SHA-256 digest read as the seed value.
pub const SEED_HEX_DIGITS: usize = 12;

/// Hash a seed string to a stable integer.
///
/// Takes the first 12 hex digits (6 bytes) of the SHA-256 digest and reads
/// them as a big-endian integer, so the result is always below 2^48.
pub fn stable_hash(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    digest[..SEED_HEX_DIGITS / 2]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

/// `stable_hash(seed) % modulus`, with a zero modulus treated as 1.
pub fn stable_pick(seed: &str, modulus: u64) -> u64 {
    stable_hash(seed) % modulus.max(1)
}

/// Short hex fingerprint of arbitrary bytes.
///
/// Format: first 8 bytes of SHA-256 as 16 lowercase hex characters.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}
