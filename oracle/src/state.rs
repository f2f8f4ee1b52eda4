use serde::{Deserialize, Serialize};

use crate::{AdmissionControl, ConfigTable, ErrorLog, JobStore, KeyRegistry, Rotation};

/// Everything the oracle persists between actions.
///
/// Actions run against a clone and replace the live state only on success.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleState {
    pub config: ConfigTable,
    pub keys: KeyRegistry,
    pub jobs: JobStore,
    pub admission: AdmissionControl,
    pub error_log: ErrorLog,
}

impl OracleState {
    /// Empty state rotating keys in the given mode.
    pub fn with_rotation(rotation: Rotation) -> Self {
        Self {
            keys: KeyRegistry::with_rotation(rotation),
            ..Self::default()
        }
    }
}
