//! ORNG operator CLI.
//!
//! Offline helpers for running the oracle: key scope ids, signature checks
//! and replaying action scripts against an in-memory service.

mod replay;

use anyhow::Context;
use clap::Parser;
use orng_crypto::{pubkey_hash_id, sha256, verify_signing_value};
use orng_oracle::{OracleConfig, OracleState};
use orng_types::{Name, RandomValue};
use orng_utils::{init_logging, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orng", about = "ORNG random-number oracle tools", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ORNG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ORNG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ORNG_LOG_FORMAT")]
    log_format: Option<String>,

    /// The oracle service's own account.
    #[arg(long, env = "ORNG_CONTRACT_ACCOUNT")]
    contract_account: Option<Name>,

    /// The account the off-chain oracle signs with.
    #[arg(long, env = "ORNG_ORACLE_ACCOUNT")]
    oracle_account: Option<Name>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the scope id (pubkey_hash_id) of a hex modulus.
    HashId {
        #[arg(long)]
        modulus: String,
    },

    /// Check an oracle signature over a signing value and print the value a
    /// dapp would receive.
    Verify {
        #[arg(long, default_value = "10001")]
        exponent: String,
        #[arg(long)]
        modulus: String,
        #[arg(long)]
        signing_value: u64,
        /// Hex-encoded PKCS#1 v1.5 signature.
        #[arg(long)]
        signature: String,
    },

    /// Apply a JSON action script to an in-memory oracle and print one
    /// JSON report line per action.
    Replay {
        #[arg(long)]
        script: PathBuf,
        /// Resume from a state file written by `--save-state`.
        #[arg(long)]
        load_state: Option<PathBuf>,
        #[arg(long)]
        save_state: Option<PathBuf>,
        /// Abort at the first rejected action.
        #[arg(long)]
        stop_on_error: bool,
    },

    /// Print the effective configuration as TOML.
    ShowConfig,

    /// Print the oracle version.
    Version,
}

fn load_config(cli: &Cli) -> anyhow::Result<OracleConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            let config = OracleConfig::from_toml_file(path_str)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            config
        }
        None => OracleConfig::default(),
    };

    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    if let Some(account) = &cli.contract_account {
        config.contract_account = account.clone();
    }
    if let Some(account) = &cli.oracle_account {
        config.oracle_account = account.clone();
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::HashId { modulus } => {
            println!("{}", pubkey_hash_id(&modulus));
        }
        Command::Verify {
            exponent,
            modulus,
            signing_value,
            signature,
        } => {
            verify_signing_value(signing_value, &signature, &exponent, &modulus)
                .context("signature rejected")?;
            println!("{}", RandomValue::new(sha256(signature.as_bytes())));
        }
        Command::Replay {
            script,
            load_state,
            save_state,
            stop_on_error,
        } => {
            let script = replay::Script::from_file(&script)?;
            let initial = match load_state {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading state {}", path.display()))?;
                    Some(serde_json::from_str::<OracleState>(&content)?)
                }
                None => None,
            };

            let report = replay::run(config, &script, initial, stop_on_error)?;
            for step in &report.steps {
                println!("{}", serde_json::to_string(step)?);
            }
            for delivery in &report.deliveries {
                tracing::info!(
                    recipient = %delivery.recipient,
                    assoc_id = delivery.assoc_id,
                    random_value = %delivery.random_value,
                    "delivered"
                );
            }
            if let Some(path) = save_state {
                std::fs::write(&path, serde_json::to_string_pretty(&report.state)?)
                    .with_context(|| format!("writing state {}", path.display()))?;
                tracing::info!(path = %path.display(), "saved oracle state");
            }
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Version => {
            println!("{}", orng_oracle::VERSION);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "oracle_account = \"fileoracle\"\nlog_level = \"debug\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "orng",
            "--config",
            &path,
            "--oracle-account",
            "cliorac",
            "show-config",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.oracle_account.as_str(), "cliorac");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn rejects_invalid_account_flag() {
        let result = Cli::try_parse_from(["orng", "--oracle-account", "Bad Name", "version"]);
        assert!(result.is_err());
    }
}
