//! Outstanding randomness requests.

use serde::{Deserialize, Serialize};

use crate::Name;

/// Job identifier, allocated from a monotonic auto-index and never reused.
pub type JobId = u64;

/// One outstanding randomness request awaiting a signed value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Consumer-defined correlation id, echoed back on delivery. Not unique.
    pub assoc_id: u64,
    /// The nonce the oracle must sign.
    pub signing_value: u64,
    /// The dapp that receives the result.
    pub caller: Name,
}
