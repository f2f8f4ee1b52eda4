//! Replays a JSON script of signed actions against an in-memory oracle.

use anyhow::Context;
use orng_nullables::{NullLedger, NullResultSink};
use orng_oracle::{OracleConfig, OracleService, OracleState, SignedAction};
use orng_types::{Delivery, Name, PermissionLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A replay script: the ledger's accounts and delegations, then the actions.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub accounts: Vec<Name>,
    #[serde(default)]
    pub delegations: Vec<Delegation>,
    pub actions: Vec<SignedAction>,
}

/// `delegate` may act wherever `permission` is required.
#[derive(Debug, Deserialize)]
pub struct Delegation {
    pub permission: PermissionLevel,
    pub delegate: PermissionLevel,
}

/// One line of the replay report.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub action: &'static str,
    #[serde(flatten)]
    pub result: StepResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepResult {
    Ok(orng_oracle::ActionOutcome),
    Rejected(String),
}

pub struct Replay {
    pub steps: Vec<StepReport>,
    pub deliveries: Vec<Delivery>,
    pub state: OracleState,
}

impl Script {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
    }
}

/// Run every action in order. Rejected actions are reported and skipped
/// unless `stop_on_error` is set.
pub fn run(
    config: OracleConfig,
    script: &Script,
    initial: Option<OracleState>,
    stop_on_error: bool,
) -> anyhow::Result<Replay> {
    let ledger = Arc::new(NullLedger::new());
    ledger.create_account(config.contract_account.clone());
    ledger.create_account(config.oracle_account.clone());
    for account in &script.accounts {
        ledger.create_account(account.clone());
    }
    for d in &script.delegations {
        ledger.delegate(d.permission.clone(), d.delegate.clone());
    }

    let sink = Arc::new(NullResultSink::new());
    let mut service = OracleService::new(config, ledger, sink.clone());
    if let Some(state) = initial {
        service = service.with_state(state);
    }

    let mut steps = Vec::with_capacity(script.actions.len());
    for (step, signed) in script.actions.iter().enumerate() {
        let action = signed.action.name();
        match service.apply_signed(signed) {
            Ok(outcome) => steps.push(StepReport {
                step,
                action,
                result: StepResult::Ok(outcome),
            }),
            Err(e) => {
                tracing::info!(step, action, error = %e, "action rejected");
                steps.push(StepReport {
                    step,
                    action,
                    result: StepResult::Rejected(e.to_string()),
                });
                if stop_on_error {
                    anyhow::bail!("step {step} ({action}) rejected: {e}");
                }
            }
        }
    }

    Ok(Replay {
        steps,
        deliveries: sink.deliveries(),
        state: service.state().clone(),
    })
}
