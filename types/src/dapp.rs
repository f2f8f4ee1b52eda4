//! Per-dapp admission state.

use serde::{Deserialize, Serialize};

use crate::Name;

/// Quota and logging configuration for one consumer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappConfig {
    /// Explicit cap on outstanding jobs. `None` falls back to the service-wide
    /// default.
    pub max_jobs_allowed: Option<u64>,
    /// Live count of this dapp's outstanding jobs.
    pub num_jobs_in_q: u64,
    /// Cap on stored error log entries. `None` uses the default size.
    pub errorlogsize: Option<u64>,
}

/// A payee's nomination of a bandwidth payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwPayerLink {
    pub payee: Name,
    pub payer: Name,
    pub accepted: bool,
}
