//! RSA signing keys and the key rotation configuration.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// Key identifier; assigned consecutively from 0 with no gaps.
pub type KeyId = u64;

/// A registered RSA public key.
///
/// `exponent` and `modulus` are big-endian hex integers with leading zeroes
/// stripped, as produced by `openssl rsa -pubin -text -noout`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub id: KeyId,
    pub exponent: String,
    pub modulus: String,
    /// 63-bit digest of the modulus; names the key's signing-value scope.
    pub pubkey_hash_id: u64,
    /// Highest job id this key is authoritative for. `None` until the key
    /// first becomes responsible for a job.
    pub last: Option<JobId>,
}

impl PublicKey {
    /// Whether this key signs the given job.
    pub fn covers(&self, job_id: JobId) -> bool {
        self.last.is_some_and(|last| last >= job_id)
    }
}

/// Singleton describing which key signs new jobs and how often keys rotate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    pub active_key_index: KeyId,
    /// The id the next registered key must carry.
    pub available_key_counter: KeyId,
    /// Expected number of jobs signed by each key before rotating.
    pub chance_to_switch: u64,
}

impl KeyConfig {
    pub const DEFAULT_CHANCE_TO_SWITCH: u64 = 1_000_000;

    /// Configuration created by the first key registration.
    pub fn initial(chance_to_switch: u64) -> Self {
        Self {
            active_key_index: 0,
            available_key_counter: 1,
            chance_to_switch,
        }
    }

    /// Whether a key after the active one has been registered.
    pub fn has_next_key(&self) -> bool {
        self.active_key_index + 1 < self.available_key_counter
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::initial(Self::DEFAULT_CHANCE_TO_SWITCH)
    }
}
