//! Cryptographic primitives for the ORNG oracle.
//!
//! - **SHA-256** for delivered random values and key scope ids
//! - **RSA PKCS#1 v1.5 / SHA-256** for verifying the oracle's signatures over
//!   signing values

pub mod error;
pub mod hash;
pub mod signature;

pub use error::CryptoError;
pub use hash::{hash_to_int, pubkey_hash_id, sha256};
pub use signature::{encode_signing_value, verify_signing_value, RsaPublicKeyHex};
