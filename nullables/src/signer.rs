//! Nullable signer — a deterministic stand-in for the off-chain oracle.

use orng_crypto::encode_signing_value;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// An RSA key pair generated from a fixed seed.
///
/// Signs signing values exactly as the oracle process does: PKCS#1 v1.5 over
/// SHA-256 of the 8-byte little-endian encoding, hex-encoded.
pub struct NullSigner {
    private: RsaPrivateKey,
    exponent: String,
    modulus: String,
}

static FIXTURES: OnceLock<Vec<NullSigner>> = OnceLock::new();

impl NullSigner {
    pub const KEY_BITS: usize = 1024;
    pub const FIXTURE_COUNT: usize = 4;

    /// Generate a key pair from a seed.
    ///
    /// # Panics
    /// Panics if key generation fails, which only happens for invalid sizes.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let private = RsaPrivateKey::new(&mut rng, Self::KEY_BITS).expect("RSA key generation");
        let public = private.to_public_key();
        Self {
            exponent: stripped_hex(&public.e().to_bytes_be()),
            modulus: stripped_hex(&public.n().to_bytes_be()),
            private,
        }
    }

    /// One of a small set of shared keys, generated once per process.
    ///
    /// # Panics
    /// Panics if `index >= FIXTURE_COUNT`.
    pub fn fixture(index: usize) -> &'static NullSigner {
        let fixtures = FIXTURES.get_or_init(|| {
            (0..Self::FIXTURE_COUNT as u64)
                .map(|i| Self::from_seed(0x6f72_6e67 + i))
                .collect()
        });
        &fixtures[index]
    }

    /// Public exponent as stripped hex.
    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    /// Modulus as stripped hex.
    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    /// Hex signature over a signing value.
    ///
    /// # Panics
    /// Panics if signing fails, which cannot happen for a well-formed key.
    pub fn sign(&self, signing_value: u64) -> String {
        let digest = Sha256::digest(encode_signing_value(signing_value));
        let signature = self
            .private
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .expect("PKCS#1 v1.5 signing");
        hex::encode(signature)
    }
}

fn stripped_hex(bytes: &[u8]) -> String {
    hex::encode(bytes).trim_start_matches('0').to_string()
}
