//! Per-dapp admission: outstanding-job quota, bans and bandwidth payers.

use orng_store::AccountDirectory;
use orng_types::{BwPayerLink, DappConfig, Name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::OracleError;

/// Service-wide caps in force for one admission decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionLimits {
    /// Cap for dapps without an override or an accepted payer.
    pub free_max_jobs: u64,
    /// Cap for dapps whose bandwidth payer has accepted.
    pub bw_paid_max_jobs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionControl {
    dapps: BTreeMap<Name, DappConfig>,
    banned: BTreeSet<Name>,
    /// Keyed by payee.
    bw_payers: BTreeMap<Name, BwPayerLink>,
}

impl AdmissionControl {
    /// Passing this to [`set_max_jobs`](Self::set_max_jobs) removes the
    /// dapp's override.
    pub const UNSET_MAX_JOBS: u64 = u64::MAX;

    pub fn dapp(&self, dapp: &Name) -> Option<&DappConfig> {
        self.dapps.get(dapp)
    }

    pub fn is_banned(&self, dapp: &Name) -> bool {
        self.banned.contains(dapp)
    }

    pub fn banned(&self) -> impl Iterator<Item = &Name> {
        self.banned.iter()
    }

    pub fn in_flight(&self, dapp: &Name) -> u64 {
        self.dapps.get(dapp).map_or(0, |c| c.num_jobs_in_q)
    }

    pub fn effective_cap(&self, dapp: &Name, limits: &AdmissionLimits) -> u64 {
        if let Some(cap) = self.dapps.get(dapp).and_then(|c| c.max_jobs_allowed) {
            return cap;
        }
        let paid = self
            .bw_payers
            .get(dapp)
            .is_some_and(|link| link.accepted);
        if paid {
            limits.bw_paid_max_jobs
        } else {
            limits.free_max_jobs
        }
    }

    /// Admit one job for `dapp`: reject a signing value already in `used`,
    /// reject a full queue, otherwise count the job and record the value.
    ///
    /// Bans are handled by the caller before a job id is allocated.
    pub fn check_and_reserve(
        &mut self,
        dapp: &Name,
        signing_value: u64,
        used: &mut BTreeSet<u64>,
        limits: &AdmissionLimits,
    ) -> Result<(), OracleError> {
        if used.contains(&signing_value) {
            return Err(OracleError::DuplicateSigningValue(signing_value));
        }
        let cap = self.effective_cap(dapp, limits);
        let in_flight = self.in_flight(dapp);
        if in_flight >= cap {
            return Err(OracleError::QueueFull {
                dapp: dapp.clone(),
                in_flight,
                cap,
            });
        }

        self.dapps.entry(dapp.clone()).or_default().num_jobs_in_q += 1;
        used.insert(signing_value);
        Ok(())
    }

    /// Return one queue slot after a job is resolved or killed.
    pub fn release(&mut self, dapp: &Name) {
        if let Some(config) = self.dapps.get_mut(dapp) {
            config.num_jobs_in_q = config.num_jobs_in_q.saturating_sub(1);
        }
    }

    pub fn set_max_jobs(&mut self, dapp: &Name, max_jobs: u64) {
        let config = self.dapps.entry(dapp.clone()).or_default();
        config.max_jobs_allowed = (max_jobs != Self::UNSET_MAX_JOBS).then_some(max_jobs);
        tracing::info!(%dapp, max_jobs = ?config.max_jobs_allowed, "set dapp job cap");
    }

    pub fn ban(&mut self, dapp: &Name) -> Result<(), OracleError> {
        if !self.banned.insert(dapp.clone()) {
            return Err(OracleError::AlreadyBanned(dapp.clone()));
        }
        tracing::info!(%dapp, "banned dapp");
        Ok(())
    }

    pub fn unban(&mut self, dapp: &Name) -> Result<(), OracleError> {
        if !self.banned.remove(dapp) {
            return Err(OracleError::NotBanned(dapp.clone()));
        }
        tracing::info!(%dapp, "unbanned dapp");
        Ok(())
    }

    pub fn set_error_log_size(&mut self, dapp: &Name, size: u64) {
        self.dapps.entry(dapp.clone()).or_default().errorlogsize = Some(size);
    }

    pub fn error_log_cap(&self, dapp: &Name, default: u64) -> u64 {
        self.dapps
            .get(dapp)
            .and_then(|c| c.errorlogsize)
            .unwrap_or(default)
    }

    pub fn bandwidth_payer(&self, payee: &Name) -> Option<&BwPayerLink> {
        self.bw_payers.get(payee)
    }

    /// Nominate `payer` for `payee`. A new nomination starts unaccepted.
    pub fn set_bandwidth_payer<D: AccountDirectory + ?Sized>(
        &mut self,
        payee: &Name,
        payer: &Name,
        directory: &D,
    ) -> Result<(), OracleError> {
        if !directory.account_exists(payee)? {
            return Err(OracleError::PayeeNotFound(payee.clone()));
        }
        if !directory.account_exists(payer)? {
            return Err(OracleError::PayerNotFound(payer.clone()));
        }
        if let Some(link) = self.bw_payers.get(payee) {
            if &link.payer == payer {
                return Err(OracleError::PayerAlreadySet {
                    payee: payee.clone(),
                    payer: payer.clone(),
                });
            }
        }

        self.bw_payers.insert(
            payee.clone(),
            BwPayerLink {
                payee: payee.clone(),
                payer: payer.clone(),
                accepted: false,
            },
        );
        tracing::info!(%payee, %payer, "nominated bandwidth payer");
        Ok(())
    }

    pub fn accept_bandwidth_pay(
        &mut self,
        payee: &Name,
        payer: &Name,
        accepted: bool,
    ) -> Result<(), OracleError> {
        let link = self
            .bw_payers
            .get_mut(payee)
            .ok_or_else(|| OracleError::PayeeNotFound(payee.clone()))?;
        if &link.payer != payer {
            return Err(OracleError::InvalidPayer {
                payee: payee.clone(),
                payer: payer.clone(),
            });
        }
        link.accepted = accepted;
        tracing::info!(%payee, %payer, accepted, "bandwidth payer responded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orng_nullables::NullLedger;

    const LIMITS: AdmissionLimits = AdmissionLimits {
        free_max_jobs: 2,
        bw_paid_max_jobs: 5,
    };

    fn name(s: &str) -> Name {
        Name::parse(s).unwrap()
    }

    #[test]
    fn reserve_counts_and_records() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        let mut used = BTreeSet::new();
        admission.check_and_reserve(&dapp, 7, &mut used, &LIMITS).unwrap();
        assert_eq!(admission.in_flight(&dapp), 1);
        assert!(used.contains(&7));

        assert!(matches!(
            admission.check_and_reserve(&dapp, 7, &mut used, &LIMITS),
            Err(OracleError::DuplicateSigningValue(7))
        ));
        assert_eq!(admission.in_flight(&dapp), 1);
    }

    #[test]
    fn queue_full_at_cap() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        let mut used = BTreeSet::new();
        admission.check_and_reserve(&dapp, 1, &mut used, &LIMITS).unwrap();
        admission.check_and_reserve(&dapp, 2, &mut used, &LIMITS).unwrap();
        assert!(matches!(
            admission.check_and_reserve(&dapp, 3, &mut used, &LIMITS),
            Err(OracleError::QueueFull { in_flight: 2, cap: 2, .. })
        ));
        assert!(!used.contains(&3));

        admission.release(&dapp);
        admission.check_and_reserve(&dapp, 3, &mut used, &LIMITS).unwrap();
    }

    #[test]
    fn release_never_underflows() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        admission.release(&dapp);
        admission.set_max_jobs(&dapp, 3);
        admission.release(&dapp);
        assert_eq!(admission.in_flight(&dapp), 0);
    }

    #[test]
    fn override_and_sentinel() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        admission.set_max_jobs(&dapp, 10);
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 10);
        admission.set_max_jobs(&dapp, 0);
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 0);
        admission.set_max_jobs(&dapp, AdmissionControl::UNSET_MAX_JOBS);
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 2);
    }

    #[test]
    fn ban_toggles() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        assert!(matches!(admission.unban(&dapp), Err(OracleError::NotBanned(_))));
        admission.ban(&dapp).unwrap();
        assert!(admission.is_banned(&dapp));
        assert!(matches!(admission.ban(&dapp), Err(OracleError::AlreadyBanned(_))));
        admission.unban(&dapp).unwrap();
        assert!(!admission.is_banned(&dapp));
    }

    #[test]
    fn bandwidth_payer_lifecycle() {
        let ledger = NullLedger::with_accounts(["dapp", "payer", "other"].map(name));
        let mut admission = AdmissionControl::default();
        let (dapp, payer, other) = (name("dapp"), name("payer"), name("other"));

        assert!(matches!(
            admission.set_bandwidth_payer(&dapp, &name("ghost"), &ledger),
            Err(OracleError::PayerNotFound(_))
        ));
        assert!(matches!(
            admission.set_bandwidth_payer(&name("ghost"), &payer, &ledger),
            Err(OracleError::PayeeNotFound(_))
        ));

        admission.set_bandwidth_payer(&dapp, &payer, &ledger).unwrap();
        assert!(matches!(
            admission.set_bandwidth_payer(&dapp, &payer, &ledger),
            Err(OracleError::PayerAlreadySet { .. })
        ));
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 2);

        assert!(matches!(
            admission.accept_bandwidth_pay(&dapp, &other, true),
            Err(OracleError::InvalidPayer { .. })
        ));
        admission.accept_bandwidth_pay(&dapp, &payer, true).unwrap();
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 5);

        // Switching payer resets acceptance.
        admission.set_bandwidth_payer(&dapp, &other, &ledger).unwrap();
        assert!(!admission.bandwidth_payer(&dapp).unwrap().accepted);
        assert_eq!(admission.effective_cap(&dapp, &LIMITS), 2);
    }

    #[test]
    fn accept_without_nomination() {
        let mut admission = AdmissionControl::default();
        assert!(matches!(
            admission.accept_bandwidth_pay(&name("dapp"), &name("payer"), true),
            Err(OracleError::PayeeNotFound(_))
        ));
    }

    #[test]
    fn error_log_cap_defaults() {
        let mut admission = AdmissionControl::default();
        let dapp = name("dapp");
        assert_eq!(admission.error_log_cap(&dapp, 10), 10);
        admission.set_error_log_size(&dapp, 0);
        assert_eq!(admission.error_log_cap(&dapp, 10), 0);
    }
}
