//! Oracle configuration with TOML file support.

use orng_types::{KeyConfig, Name};
use serde::{Deserialize, Serialize};

use crate::rotation::{RandomRotation, Rotation};
use crate::OracleError;

/// How the active signing key hands over to the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Every key signs exactly `chance_to_switch` consecutive jobs.
    #[default]
    Scheduled,
    /// Each request rotates with probability `1 / chance_to_switch`.
    Random,
}

/// Static configuration for an oracle service.
///
/// Values that can change at runtime (`freemaxjobs`, `bwpaidmaxjob`) live in
/// the [`ConfigTable`](crate::ConfigTable); the fields here are their defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleConfig {
    /// The service's own account. Authorizes administrative actions.
    #[serde(default = "default_contract_account")]
    pub contract_account: Name,

    /// The account the off-chain oracle signs results with.
    #[serde(default = "default_oracle_account")]
    pub oracle_account: Name,

    /// Outstanding-job cap for dapps without an explicit limit.
    #[serde(default = "default_free_max_jobs")]
    pub free_max_jobs: u64,

    /// Outstanding-job cap for dapps with an accepted bandwidth payer.
    #[serde(default = "default_bw_paid_max_jobs")]
    pub bw_paid_max_jobs: u64,

    /// Error log entries kept per dapp unless the dapp sets its own size.
    #[serde(default = "default_error_log_size")]
    pub error_log_size: u64,

    /// `chance_to_switch` installed by the first key registration.
    #[serde(default = "default_chance_to_switch")]
    pub chance_to_switch: u64,

    #[serde(default)]
    pub rotation: RotationMode,

    /// Seed for [`RotationMode::Random`]. Drawn from the OS when absent.
    #[serde(default)]
    pub rotation_seed: Option<u64>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_contract_account() -> Name {
    Name::parse("orng.wax").expect("valid default account")
}

fn default_oracle_account() -> Name {
    Name::parse("oracle.wax").expect("valid default account")
}

fn default_free_max_jobs() -> u64 {
    100
}

fn default_bw_paid_max_jobs() -> u64 {
    1_000
}

fn default_error_log_size() -> u64 {
    10
}

fn default_chance_to_switch() -> u64 {
    KeyConfig::DEFAULT_CHANCE_TO_SWITCH
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl OracleConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, OracleError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| OracleError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, OracleError> {
        let config: Self = toml::from_str(s).map_err(|e| OracleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, OracleError> {
        toml::to_string_pretty(self).map_err(|e| OracleError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), OracleError> {
        if self.chance_to_switch == 0 {
            return Err(OracleError::Config(
                "chance_to_switch must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Rotation state for a fresh oracle in the configured mode.
    pub fn rotation(&self) -> Rotation {
        match self.rotation {
            RotationMode::Scheduled => Rotation::Scheduled,
            RotationMode::Random => Rotation::Random(match self.rotation_seed {
                Some(seed) => RandomRotation::from_seed(seed),
                None => RandomRotation::from_entropy(),
            }),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            contract_account: default_contract_account(),
            oracle_account: default_oracle_account(),
            free_max_jobs: default_free_max_jobs(),
            bw_paid_max_jobs: default_bw_paid_max_jobs(),
            error_log_size: default_error_log_size(),
            chance_to_switch: default_chance_to_switch(),
            rotation: RotationMode::default(),
            rotation_seed: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = OracleConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = OracleConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.oracle_account, config.oracle_account);
        assert_eq!(parsed.free_max_jobs, config.free_max_jobs);
        assert_eq!(parsed.rotation, RotationMode::Scheduled);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = OracleConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.contract_account.as_str(), "orng.wax");
        assert_eq!(config.free_max_jobs, 100);
        assert_eq!(config.error_log_size, 10);
        assert_eq!(config.chance_to_switch, 1_000_000);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            oracle_account = "myoracle"
            free_max_jobs = 5
            rotation = "random"
            rotation_seed = 7
        "#;
        let config = OracleConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.oracle_account.as_str(), "myoracle");
        assert_eq!(config.free_max_jobs, 5);
        assert_eq!(config.rotation, RotationMode::Random);
        assert_eq!(config.rotation_seed, Some(7));
        assert_eq!(config.bw_paid_max_jobs, 1_000); // default
        assert_eq!(config.rotation(), Rotation::random(7));
    }

    #[test]
    fn invalid_account_name_rejected() {
        let result = OracleConfig::from_toml_str(r#"oracle_account = "Not A Name""#);
        assert!(matches!(result, Err(OracleError::Config(_))));
    }

    #[test]
    fn zero_chance_rejected() {
        let result = OracleConfig::from_toml_str("chance_to_switch = 0");
        assert!(matches!(result, Err(OracleError::Config(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "error_log_size = 3").unwrap();
        let config = OracleConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.error_log_size, 3);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = OracleConfig::from_toml_file("/nonexistent/orng.toml");
        assert!(matches!(result, Err(OracleError::Config(_))));
    }
}
