//! Oracle service: the action entry points.
//!
//! Every entry point runs against a clone of the current state. The clone
//! replaces the live state only when the entry point succeeds, so a rejected
//! action leaves nothing behind. Result deliveries are queued during the
//! action and handed to the [`ResultSink`] after commit.

use orng_store::{Ledger, Requirement, ResultSink};
use orng_types::{Delivery, JobId, KeyId, Name, PermissionLevel, RandomValue};
use std::sync::Arc;

use crate::verifier::verify_job_signature;
use crate::{ConfigTable, OracleConfig, OracleError, OracleState, RotationMode};

/// Semantic version reported by the `version` action.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Permission of the service account that may toggle pause flags.
pub const PAUSE_PERMISSION: &str = "pause";

/// Permission a dapp grants for reporting job errors.
pub const LOG_PERMISSION: &str = "ornglog";

/// What happened to an accepted `requestrand`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A job was created under this id.
    Queued(JobId),
    /// The caller is banned; the request succeeded without effect.
    Dropped,
}

/// Working set of one action.
struct Txn<'a> {
    state: OracleState,
    config: &'a OracleConfig,
    ledger: &'a dyn Ledger,
    outbox: Vec<Delivery>,
}

pub struct OracleService {
    config: OracleConfig,
    state: OracleState,
    ledger: Arc<dyn Ledger>,
    sink: Arc<dyn ResultSink>,
}

impl OracleService {
    /// Create a service with empty state in the rotation mode the
    /// configuration names.
    pub fn new(config: OracleConfig, ledger: Arc<dyn Ledger>, sink: Arc<dyn ResultSink>) -> Self {
        let state = OracleState::with_rotation(config.rotation());
        Self {
            config,
            state,
            ledger,
            sink,
        }
    }

    /// Resume from previously persisted state.
    ///
    /// The state keeps the rotation mode and generator position it was saved
    /// with; the configured mode only applies to fresh state.
    pub fn with_state(mut self, state: OracleState) -> Self {
        let stored = state.keys.rotation().is_random();
        if stored != (self.config.rotation == RotationMode::Random) {
            tracing::warn!(
                stored = if stored { "random" } else { "scheduled" },
                configured = ?self.config.rotation,
                "resumed state keeps its own rotation mode"
            );
        }
        self.state = state;
        self
    }

    pub fn state(&self) -> &OracleState {
        &self.state
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn version(&self) -> &'static str {
        VERSION
    }

    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut Txn<'_>) -> Result<T, OracleError>,
    ) -> Result<T, OracleError> {
        let mut txn = Txn {
            state: self.state.clone(),
            config: &self.config,
            ledger: self.ledger.as_ref(),
            outbox: Vec::new(),
        };
        let value = op(&mut txn)?;

        let Txn { state, outbox, .. } = txn;
        self.state = state;
        for delivery in &outbox {
            if let Err(e) = self.sink.deliver(delivery) {
                tracing::warn!(
                    recipient = %delivery.recipient,
                    assoc_id = delivery.assoc_id,
                    error = %e,
                    "result delivery failed"
                );
            }
        }
        Ok(value)
    }

    // ── Consumer actions ────────────────────────────────────────────────

    /// Queue a randomness request for `caller`.
    ///
    /// A banned caller gets [`RequestOutcome::Dropped`] and nothing changes.
    pub fn request_rand(
        &mut self,
        auths: &[PermissionLevel],
        assoc_id: u64,
        signing_value: u64,
        caller: &Name,
    ) -> Result<RequestOutcome, OracleError> {
        self.transact(|txn| {
            let state = &mut txn.state;
            if state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            if state.config.is_request_paused() {
                return Err(OracleError::RequestsPaused);
            }
            authorize(txn.ledger, auths, Requirement::Actor(caller.clone()))?;

            if state.admission.is_banned(caller) {
                tracing::debug!(%caller, assoc_id, "dropped request from banned dapp");
                return Ok(RequestOutcome::Dropped);
            }

            let job_id = state.jobs.next_id();
            let scope = state.keys.assign(job_id)?;
            let limits = state.config.limits(txn.config);
            let used = state.keys.signing_scope_mut(scope);
            state
                .admission
                .check_and_reserve(caller, signing_value, used, &limits)?;
            let job = state.jobs.insert(assoc_id, signing_value, caller.clone());

            tracing::debug!(job_id = job.id, %caller, assoc_id, signing_value, "queued job");
            Ok(RequestOutcome::Queued(job.id))
        })
    }

    /// Change how many error log entries a dapp keeps. Takes effect on the
    /// next report.
    pub fn set_error_size(
        &mut self,
        auths: &[PermissionLevel],
        dapp: &Name,
        queue_size: u64,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, Requirement::Actor(dapp.clone()))?;
            txn.state.admission.set_error_log_size(dapp, queue_size);
            tracing::debug!(%dapp, queue_size, "set error log size");
            Ok(())
        })
    }

    /// Record an error a dapp hit while consuming `job_id`. Returns the log
    /// entry id.
    pub fn dapp_error(
        &mut self,
        auths: &[PermissionLevel],
        dapp: &Name,
        job_id: JobId,
        message: &str,
    ) -> Result<u64, OracleError> {
        self.transact(|txn| {
            let state = &mut txn.state;
            let job = state
                .jobs
                .get(job_id)
                .ok_or(OracleError::JobNotFound(job_id))?;
            if &job.caller != dapp {
                return Err(OracleError::DappMismatch {
                    job_id,
                    owner: job.caller.clone(),
                    dapp: dapp.clone(),
                });
            }
            authorize(
                txn.ledger,
                auths,
                Requirement::Permission(dapp.permission(LOG_PERMISSION)?),
            )?;

            let cap = state
                .admission
                .error_log_cap(dapp, txn.config.error_log_size);
            let id = state.error_log.append(job, message, cap);
            tracing::debug!(%dapp, job_id, entry = id, "logged dapp error");
            Ok(id)
        })
    }

    // ── Oracle actions ──────────────────────────────────────────────────

    /// Resolve a job with the oracle's signature and deliver the result.
    pub fn set_rand(
        &mut self,
        auths: &[PermissionLevel],
        job_id: JobId,
        random_value: &str,
    ) -> Result<RandomValue, OracleError> {
        self.transact(|txn| {
            let state = &mut txn.state;
            if state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            authorize(txn.ledger, auths, oracle(txn.config))?;

            let job = state
                .jobs
                .get(job_id)
                .cloned()
                .ok_or(OracleError::JobNotFound(job_id))?;
            let key = state
                .keys
                .key_for_job(job_id)
                .ok_or(OracleError::NoKeyForJob(job_id))?;
            let value = verify_job_signature(&job, random_value, key)?;

            state.admission.release(&job.caller);
            state.jobs.remove(job_id);
            tracing::debug!(job_id, caller = %job.caller, "resolved job");
            txn.outbox.push(Delivery {
                recipient: job.caller,
                assoc_id: job.assoc_id,
                random_value: value,
            });
            Ok(value)
        })
    }

    /// Drop outstanding jobs without resolving them. Unknown ids are
    /// skipped; returns the ids actually removed.
    pub fn kill_jobs(
        &mut self,
        auths: &[PermissionLevel],
        job_ids: &[JobId],
    ) -> Result<Vec<JobId>, OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, oracle(txn.config))?;
            let state = &mut txn.state;
            let removed = state.jobs.remove_many(job_ids);
            for job in &removed {
                state.admission.release(&job.caller);
            }
            tracing::info!(requested = job_ids.len(), removed = removed.len(), "killed jobs");
            Ok(removed.into_iter().map(|job| job.id).collect())
        })
    }

    pub fn set_sig_pub_key(
        &mut self,
        auths: &[PermissionLevel],
        id: KeyId,
        exponent: &str,
        modulus: &str,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            if txn.state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            authorize(txn.ledger, auths, oracle(txn.config))?;
            txn.state
                .keys
                .register(id, exponent, modulus, txn.config.chance_to_switch)?;
            Ok(())
        })
    }

    pub fn set_chance(
        &mut self,
        auths: &[PermissionLevel],
        chance_to_switch: u64,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            if txn.state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            authorize(txn.ledger, auths, oracle(txn.config))?;
            txn.state.keys.set_chance(chance_to_switch)
        })
    }

    /// Delete up to `rows_num` recorded signing values of a retired key.
    pub fn clean_sig_vals(
        &mut self,
        auths: &[PermissionLevel],
        scope: u64,
        rows_num: u64,
    ) -> Result<usize, OracleError> {
        self.transact(|txn| {
            if txn.state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            authorize(txn.ledger, auths, oracle(txn.config))?;
            txn.state.keys.clean_signing_values(scope, rows_num)
        })
    }

    // ── Bandwidth payers ────────────────────────────────────────────────

    /// Nominate `payer` to cover `payee`'s bandwidth. Authorized by the
    /// payee or the service account.
    pub fn set_bw_payer(
        &mut self,
        auths: &[PermissionLevel],
        payee: &Name,
        payer: &Name,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            if txn.state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            let by_payee = Requirement::Actor(payee.clone());
            let by_service = Requirement::Actor(txn.config.contract_account.clone());
            if !txn.ledger.satisfies(auths, &by_payee) && !txn.ledger.satisfies(auths, &by_service)
            {
                return Err(OracleError::Unauthorized(by_payee));
            }
            txn.state
                .admission
                .set_bandwidth_payer(payee, payer, txn.ledger)
        })
    }

    pub fn accept_bw_pay(
        &mut self,
        auths: &[PermissionLevel],
        payee: &Name,
        payer: &Name,
        accepted: bool,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            if txn.state.config.is_paused() {
                return Err(OracleError::ContractPaused);
            }
            authorize(txn.ledger, auths, Requirement::Actor(payer.clone()))?;
            txn.state
                .admission
                .accept_bandwidth_pay(payee, payer, accepted)
        })
    }

    // ── Administration ──────────────────────────────────────────────────

    pub fn pause(&mut self, auths: &[PermissionLevel], paused: bool) -> Result<(), OracleError> {
        self.set_flag(auths, ConfigTable::PAUSED, paused)
    }

    /// Block new requests while letting the oracle drain existing jobs.
    pub fn pause_request(
        &mut self,
        auths: &[PermissionLevel],
        paused: bool,
    ) -> Result<(), OracleError> {
        self.set_flag(auths, ConfigTable::PAUSE_REQUEST, paused)
    }

    fn set_flag(
        &mut self,
        auths: &[PermissionLevel],
        flag: &'static str,
        on: bool,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            let required = txn.config.contract_account.permission(PAUSE_PERMISSION)?;
            authorize(txn.ledger, auths, Requirement::Permission(required))?;
            txn.state.config.set(flag, i64::from(on));
            tracing::info!(flag, on, "toggled pause flag");
            Ok(())
        })
    }

    /// Set a dapp's outstanding-job cap.
    /// [`UNSET_MAX_JOBS`](crate::AdmissionControl::UNSET_MAX_JOBS) removes the override.
    pub fn set_max_jobs(
        &mut self,
        auths: &[PermissionLevel],
        dapp: &Name,
        max_jobs: u64,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, service(txn.config))?;
            txn.state.admission.set_max_jobs(dapp, max_jobs);
            Ok(())
        })
    }

    pub fn ban_user(&mut self, auths: &[PermissionLevel], dapp: &Name) -> Result<(), OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, service(txn.config))?;
            txn.state.admission.ban(dapp)
        })
    }

    pub fn unban_user(&mut self, auths: &[PermissionLevel], dapp: &Name) -> Result<(), OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, service(txn.config))?;
            txn.state.admission.unban(dapp)
        })
    }

    /// Write a named config row such as `freemaxjobs` or `bwpaidmaxjob`.
    ///
    /// The pause flags are not writable here; they need the pause
    /// permission and go through [`pause`](Self::pause) and
    /// [`pause_request`](Self::pause_request).
    pub fn set_config(
        &mut self,
        auths: &[PermissionLevel],
        name: &Name,
        value: i64,
    ) -> Result<(), OracleError> {
        self.transact(|txn| {
            authorize(txn.ledger, auths, service(txn.config))?;
            if ConfigTable::is_reserved(name.as_str()) {
                return Err(OracleError::ReservedConfigRow(name.clone()));
            }
            txn.state.config.set(name.as_str(), value);
            tracing::info!(%name, value, "set config row");
            Ok(())
        })
    }
}

fn authorize(
    ledger: &dyn Ledger,
    auths: &[PermissionLevel],
    required: Requirement,
) -> Result<(), OracleError> {
    if ledger.satisfies(auths, &required) {
        Ok(())
    } else {
        Err(OracleError::Unauthorized(required))
    }
}

fn oracle(config: &OracleConfig) -> Requirement {
    Requirement::Actor(config.oracle_account.clone())
}

fn service(config: &OracleConfig) -> Requirement {
    Requirement::Actor(config.contract_account.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orng_nullables::{NullLedger, NullResultSink, NullSigner};

    struct Harness {
        service: OracleService,
        sink: Arc<NullResultSink>,
        oracle: Vec<PermissionLevel>,
        dapp: Name,
        dapp_auth: Vec<PermissionLevel>,
    }

    fn harness() -> Harness {
        let config = OracleConfig::default();
        let dapp = Name::parse("dapp").unwrap();
        let ledger = Arc::new(NullLedger::with_accounts([
            config.contract_account.clone(),
            config.oracle_account.clone(),
            dapp.clone(),
        ]));
        let sink = Arc::new(NullResultSink::new());
        let oracle = vec![config.oracle_account.active()];
        let dapp_auth = vec![dapp.active()];
        let service = OracleService::new(config, ledger, sink.clone());
        Harness {
            service,
            sink,
            oracle,
            dapp,
            dapp_auth,
        }
    }

    fn register(h: &mut Harness, id: KeyId, signer: &NullSigner) {
        let oracle = h.oracle.clone();
        h.service
            .set_sig_pub_key(&oracle, id, signer.exponent(), signer.modulus())
            .unwrap();
    }

    #[test]
    fn version_is_crate_version() {
        let h = harness();
        assert_eq!(h.service.version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn failed_action_leaves_state_untouched() {
        let mut h = harness();
        register(&mut h, 0, NullSigner::fixture(0));
        h.service.request_rand(&h.dapp_auth, 1, 5, &h.dapp).unwrap();
        let before = h.service.state().clone();

        let err = h
            .service
            .request_rand(&h.dapp_auth, 2, 5, &h.dapp)
            .unwrap_err();
        assert!(matches!(err, OracleError::DuplicateSigningValue(5)));
        assert_eq!(h.service.state(), &before);
    }

    #[test]
    fn delivery_happens_after_commit() {
        let mut h = harness();
        let signer = NullSigner::fixture(0);
        register(&mut h, 0, signer);
        h.service.request_rand(&h.dapp_auth, 77, 9, &h.dapp).unwrap();

        assert!(h.service.set_rand(&h.oracle, 0, &signer.sign(10)).is_err());
        assert!(h.sink.deliveries().is_empty());

        let value = h.service.set_rand(&h.oracle, 0, &signer.sign(9)).unwrap();
        let delivery = h.sink.last_delivery().unwrap();
        assert_eq!(delivery.recipient, h.dapp);
        assert_eq!(delivery.assoc_id, 77);
        assert_eq!(delivery.random_value, value);
    }

    #[test]
    fn rejected_delivery_still_resolves_job() {
        let mut h = harness();
        let signer = NullSigner::fixture(0);
        register(&mut h, 0, signer);
        h.service.request_rand(&h.dapp_auth, 1, 9, &h.dapp).unwrap();
        h.sink.reject_deliveries(true);

        h.service.set_rand(&h.oracle, 0, &signer.sign(9)).unwrap();
        assert!(h.service.state().jobs.is_empty());
        assert_eq!(h.service.state().admission.in_flight(&h.dapp), 0);
    }

    #[test]
    fn request_without_keys_fails() {
        let mut h = harness();
        assert!(matches!(
            h.service.request_rand(&h.dapp_auth, 1, 1, &h.dapp),
            Err(OracleError::NoKeyConfig)
        ));
        assert_eq!(h.service.state().jobs.next_id(), 0);
    }
}
