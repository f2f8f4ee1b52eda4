//! SHA-256 hashing for random values and key scope ids.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Sha256::digest(data));
    output
}

/// Fold a digest into a 63-bit non-negative integer.
///
/// The first eight bytes are packed big-endian with each byte masked to its
/// low seven bits, so the top bit of the result is always clear.
pub fn hash_to_int(digest: &[u8; 32]) -> u64 {
    digest[..8]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(byte & 0x7f))
}

/// Scope id of a public key: `hash_to_int(sha256(modulus))` over the modulus
/// hex text exactly as registered.
pub fn pubkey_hash_id(modulus: &str) -> u64 {
    hash_to_int(&sha256(modulus.as_bytes()))
}
