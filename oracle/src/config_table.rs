//! Named integer configuration rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AdmissionLimits, OracleConfig};

/// The service's mutable `name -> i64` settings.
///
/// Rows that were never written read as the caller-supplied default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTable {
    rows: BTreeMap<String, i64>,
}

impl ConfigTable {
    /// Blocks every pausable action.
    pub const PAUSED: &'static str = "paused";
    /// Blocks only `requestrand`.
    pub const PAUSE_REQUEST: &'static str = "pauserequest";
    pub const FREE_MAX_JOBS: &'static str = "freemaxjobs";
    pub const BW_PAID_MAX_JOBS: &'static str = "bwpaidmaxjob";

    /// Rows only the pause actions may write.
    pub fn is_reserved(name: &str) -> bool {
        name == Self::PAUSED || name == Self::PAUSE_REQUEST
    }

    pub fn get(&self, name: &str, default: i64) -> i64 {
        self.rows.get(name).copied().unwrap_or(default)
    }

    pub fn set(&mut self, name: &str, value: i64) {
        self.rows.insert(name.to_string(), value);
    }

    /// Read a row as an unsigned count; negative values read as zero.
    pub fn get_u64(&self, name: &str, default: u64) -> u64 {
        match self.rows.get(name) {
            Some(value) => u64::try_from(*value).unwrap_or(0),
            None => default,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.get(Self::PAUSED, 0) != 0
    }

    pub fn is_request_paused(&self) -> bool {
        self.get(Self::PAUSE_REQUEST, 0) != 0
    }

    /// Current admission caps, falling back to the configured defaults.
    pub fn limits(&self, defaults: &OracleConfig) -> AdmissionLimits {
        AdmissionLimits {
            free_max_jobs: self.get_u64(Self::FREE_MAX_JOBS, defaults.free_max_jobs),
            bw_paid_max_jobs: self.get_u64(Self::BW_PAID_MAX_JOBS, defaults.bw_paid_max_jobs),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_rows_read_default() {
        let table = ConfigTable::default();
        assert_eq!(table.get("anything", 42), 42);
        assert!(!table.is_paused());
        assert!(!table.is_request_paused());
    }

    #[test]
    fn pause_flags() {
        let mut table = ConfigTable::default();
        table.set(ConfigTable::PAUSED, 1);
        assert!(table.is_paused());
        assert!(!table.is_request_paused());
        table.set(ConfigTable::PAUSED, 0);
        table.set(ConfigTable::PAUSE_REQUEST, 1);
        assert!(!table.is_paused());
        assert!(table.is_request_paused());
    }

    #[test]
    fn pause_rows_are_reserved() {
        assert!(ConfigTable::is_reserved(ConfigTable::PAUSED));
        assert!(ConfigTable::is_reserved(ConfigTable::PAUSE_REQUEST));
        assert!(!ConfigTable::is_reserved(ConfigTable::FREE_MAX_JOBS));
    }

    #[test]
    fn limits_prefer_table_rows() {
        let defaults = OracleConfig::default();
        let mut table = ConfigTable::default();
        assert_eq!(table.limits(&defaults).free_max_jobs, 100);

        table.set(ConfigTable::FREE_MAX_JOBS, 3);
        table.set(ConfigTable::BW_PAID_MAX_JOBS, -5);
        let limits = table.limits(&defaults);
        assert_eq!(limits.free_max_jobs, 3);
        assert_eq!(limits.bw_paid_max_jobs, 0);
    }
}
