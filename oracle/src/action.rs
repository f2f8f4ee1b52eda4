//! Serializable actions and their dispatch onto [`OracleService`].
//!
//! An [`Action`] names one entry point and carries its arguments; a
//! [`SignedAction`] adds the authorizations presented with it. Both use the
//! lowercase action names the oracle's clients already know (`requestrand`,
//! `setrand`, ...).

use orng_types::{JobId, KeyId, Name, PermissionLevel, RandomValue};
use serde::{Deserialize, Serialize};

use crate::{OracleError, OracleService, RequestOutcome};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Pause {
        paused: bool,
    },
    PauseRequest {
        paused: bool,
    },
    Version,
    RequestRand {
        assoc_id: u64,
        signing_value: u64,
        caller: Name,
    },
    SetRand {
        job_id: JobId,
        random_value: String,
    },
    KillJobs {
        job_ids: Vec<JobId>,
    },
    SetSigPubKey {
        id: KeyId,
        exponent: String,
        modulus: String,
    },
    SetChance {
        chance_to_switch: u64,
    },
    CleanSigVals {
        scope: u64,
        rows_num: u64,
    },
    SetBwPayer {
        payee: Name,
        payer: Name,
    },
    AcceptBwPay {
        payee: Name,
        payer: Name,
        accepted: bool,
    },
    SetMaxJobs {
        dapp: Name,
        max_jobs: u64,
    },
    BanUser {
        dapp: Name,
    },
    UnbanUser {
        dapp: Name,
    },
    SetConfig {
        name: Name,
        value: i64,
    },
    SetErrorSize {
        dapp: Name,
        queue_size: u64,
    },
    DappError {
        dapp: Name,
        job_id: JobId,
        message: String,
    },
}

impl Action {
    /// The action's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Pause { .. } => "pause",
            Action::PauseRequest { .. } => "pauserequest",
            Action::Version => "version",
            Action::RequestRand { .. } => "requestrand",
            Action::SetRand { .. } => "setrand",
            Action::KillJobs { .. } => "killjobs",
            Action::SetSigPubKey { .. } => "setsigpubkey",
            Action::SetChance { .. } => "setchance",
            Action::CleanSigVals { .. } => "cleansigvals",
            Action::SetBwPayer { .. } => "setbwpayer",
            Action::AcceptBwPay { .. } => "acceptbwpay",
            Action::SetMaxJobs { .. } => "setmaxjobs",
            Action::BanUser { .. } => "banuser",
            Action::UnbanUser { .. } => "unbanuser",
            Action::SetConfig { .. } => "setconfig",
            Action::SetErrorSize { .. } => "seterrorsize",
            Action::DappError { .. } => "dapperror",
        }
    }
}

/// An action together with the authorizations it was submitted with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAction {
    pub authorization: Vec<PermissionLevel>,
    #[serde(flatten)]
    pub action: Action,
}

/// The result of a successfully applied action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Done,
    Version { version: String },
    Queued { job_id: JobId },
    Dropped,
    Resolved { random_value: String },
    Killed { job_ids: Vec<JobId> },
    Cleaned { rows: usize },
    Logged { entry_id: u64 },
}

impl From<RequestOutcome> for ActionOutcome {
    fn from(outcome: RequestOutcome) -> Self {
        match outcome {
            RequestOutcome::Queued(job_id) => ActionOutcome::Queued { job_id },
            RequestOutcome::Dropped => ActionOutcome::Dropped,
        }
    }
}

impl From<RandomValue> for ActionOutcome {
    fn from(value: RandomValue) -> Self {
        ActionOutcome::Resolved {
            random_value: value.to_string(),
        }
    }
}

impl OracleService {
    /// Apply one action with the given authorizations.
    pub fn apply(
        &mut self,
        auths: &[PermissionLevel],
        action: &Action,
    ) -> Result<ActionOutcome, OracleError> {
        tracing::trace!(action = action.name(), "applying action");
        let outcome = match action {
            Action::Pause { paused } => {
                self.pause(auths, *paused)?;
                ActionOutcome::Done
            }
            Action::PauseRequest { paused } => {
                self.pause_request(auths, *paused)?;
                ActionOutcome::Done
            }
            Action::Version => ActionOutcome::Version {
                version: self.version().to_string(),
            },
            Action::RequestRand {
                assoc_id,
                signing_value,
                caller,
            } => self
                .request_rand(auths, *assoc_id, *signing_value, caller)?
                .into(),
            Action::SetRand {
                job_id,
                random_value,
            } => self.set_rand(auths, *job_id, random_value)?.into(),
            Action::KillJobs { job_ids } => ActionOutcome::Killed {
                job_ids: self.kill_jobs(auths, job_ids)?,
            },
            Action::SetSigPubKey {
                id,
                exponent,
                modulus,
            } => {
                self.set_sig_pub_key(auths, *id, exponent, modulus)?;
                ActionOutcome::Done
            }
            Action::SetChance { chance_to_switch } => {
                self.set_chance(auths, *chance_to_switch)?;
                ActionOutcome::Done
            }
            Action::CleanSigVals { scope, rows_num } => ActionOutcome::Cleaned {
                rows: self.clean_sig_vals(auths, *scope, *rows_num)?,
            },
            Action::SetBwPayer { payee, payer } => {
                self.set_bw_payer(auths, payee, payer)?;
                ActionOutcome::Done
            }
            Action::AcceptBwPay {
                payee,
                payer,
                accepted,
            } => {
                self.accept_bw_pay(auths, payee, payer, *accepted)?;
                ActionOutcome::Done
            }
            Action::SetMaxJobs { dapp, max_jobs } => {
                self.set_max_jobs(auths, dapp, *max_jobs)?;
                ActionOutcome::Done
            }
            Action::BanUser { dapp } => {
                self.ban_user(auths, dapp)?;
                ActionOutcome::Done
            }
            Action::UnbanUser { dapp } => {
                self.unban_user(auths, dapp)?;
                ActionOutcome::Done
            }
            Action::SetConfig { name, value } => {
                self.set_config(auths, name, *value)?;
                ActionOutcome::Done
            }
            Action::SetErrorSize { dapp, queue_size } => {
                self.set_error_size(auths, dapp, *queue_size)?;
                ActionOutcome::Done
            }
            Action::DappError {
                dapp,
                job_id,
                message,
            } => ActionOutcome::Logged {
                entry_id: self.dapp_error(auths, dapp, *job_id, message)?,
            },
        };
        Ok(outcome)
    }

    /// Apply a signed action using its own authorizations.
    pub fn apply_signed(&mut self, signed: &SignedAction) -> Result<ActionOutcome, OracleError> {
        self.apply(&signed.authorization, &signed.action)
    }
}
