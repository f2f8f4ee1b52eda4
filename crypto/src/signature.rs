//! RSA PKCS#1 v1.5 verification of oracle signatures over signing values.

use rsa::{BigUint, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::CryptoError;

/// Encode a signing value the way the oracle signs it: 8 bytes, little-endian.
pub fn encode_signing_value(signing_value: u64) -> [u8; 8] {
    signing_value.to_le_bytes()
}

/// An RSA public key built from its hex exponent and modulus.
#[derive(Clone, Debug)]
pub struct RsaPublicKeyHex {
    key: RsaPublicKey,
}

impl RsaPublicKeyHex {
    /// Build a key from big-endian hex integers. Odd-length strings are
    /// accepted since moduli are stored with leading zeroes stripped.
    pub fn from_hex(exponent: &str, modulus: &str) -> Result<Self, CryptoError> {
        let n = decode_hex_integer("modulus", modulus)?;
        let e = decode_hex_integer("exponent", exponent)?;
        let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Verify a PKCS#1 v1.5 signature over SHA-256(`message`).
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let hashed = Sha256::digest(message);
        self.key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
            .map_err(|_| CryptoError::BadSignature)
    }
}

fn decode_hex_integer(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    if value.is_empty() {
        return Err(CryptoError::InvalidHex {
            field,
            reason: "empty".to_string(),
        });
    }
    let decoded = if value.len() % 2 == 1 {
        hex::decode(format!("0{value}"))
    } else {
        hex::decode(value)
    };
    decoded.map_err(|e| CryptoError::InvalidHex {
        field,
        reason: e.to_string(),
    })
}

/// Verify that `signature_hex` is the oracle's signature over `signing_value`
/// under the key (`exponent`, `modulus`).
pub fn verify_signing_value(
    signing_value: u64,
    signature_hex: &str,
    exponent: &str,
    modulus: &str,
) -> Result<(), CryptoError> {
    let key = RsaPublicKeyHex::from_hex(exponent, modulus)?;
    let signature = hex::decode(signature_hex).map_err(|e| CryptoError::InvalidHex {
        field: "signature",
        reason: e.to_string(),
    })?;
    key.verify(&encode_signing_value(signing_value), &signature)
}
