use serde::{Deserialize, Serialize};

use crate::{JobId, Name};

/// An error a dapp reported against one of its jobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    /// Monotonic per-dapp id; lower ids are evicted first.
    pub id: u64,
    pub dapp: Name,
    pub job_id: JobId,
    /// Captured from the job when the error was reported.
    pub assoc_id: u64,
    pub message: String,
}
