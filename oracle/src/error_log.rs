//! Bounded per-dapp log of job errors reported by dapps.

use orng_types::{ErrorLogEntry, Job, Name};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Oldest-first ring of error entries per dapp.
///
/// The cap is applied on append only; lowering a dapp's cap leaves existing
/// entries in place until the next report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    entries: BTreeMap<Name, VecDeque<ErrorLogEntry>>,
    next_ids: BTreeMap<Name, u64>,
}

impl ErrorLog {
    /// Record an error against `job` and evict the oldest entries beyond
    /// `cap`. Returns the new entry's id.
    pub fn append(&mut self, job: &Job, message: &str, cap: u64) -> u64 {
        let dapp = &job.caller;
        let next = self.next_ids.entry(dapp.clone()).or_default();
        let id = *next;
        *next += 1;

        let ring = self.entries.entry(dapp.clone()).or_default();
        ring.push_back(ErrorLogEntry {
            id,
            dapp: dapp.clone(),
            job_id: job.id,
            assoc_id: job.assoc_id,
            message: message.to_string(),
        });
        let cap = usize::try_from(cap).unwrap_or(usize::MAX);
        while ring.len() > cap {
            ring.pop_front();
        }
        if ring.is_empty() {
            self.entries.remove(dapp);
        }
        id
    }

    /// A dapp's entries, oldest first.
    pub fn entries(&self, dapp: &Name) -> impl Iterator<Item = &ErrorLogEntry> {
        self.entries.get(dapp).into_iter().flatten()
    }

    pub fn len(&self, dapp: &Name) -> usize {
        self.entries.get(dapp).map_or(0, VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64, caller: &str) -> Job {
        Job {
            id,
            assoc_id: id * 100,
            signing_value: id,
            caller: Name::parse(caller).unwrap(),
        }
    }

    #[test]
    fn keeps_most_recent_entries() {
        let mut log = ErrorLog::default();
        let j = job(4, "dapp");
        for i in 0..5 {
            log.append(&j, &format!("error {i}"), 3);
        }
        let dapp = Name::parse("dapp").unwrap();
        let kept: Vec<_> = log.entries(&dapp).map(|e| (e.id, e.message.as_str())).collect();
        assert_eq!(kept, vec![(2, "error 2"), (3, "error 3"), (4, "error 4")]);
        assert!(log.entries(&dapp).all(|e| e.assoc_id == 400 && e.job_id == 4));
    }

    #[test]
    fn zero_cap_drains_on_append() {
        let mut log = ErrorLog::default();
        let j = job(1, "dapp");
        let dapp = Name::parse("dapp").unwrap();
        log.append(&j, "a", 10);
        log.append(&j, "b", 10);
        assert_eq!(log.len(&dapp), 2);
        log.append(&j, "c", 0);
        assert_eq!(log.len(&dapp), 0);
        // Ids keep counting after a drain.
        assert_eq!(log.append(&j, "d", 10), 3);
    }

    #[test]
    fn dapps_are_independent() {
        let mut log = ErrorLog::default();
        log.append(&job(1, "alice"), "x", 1);
        log.append(&job(2, "bob"), "y", 1);
        log.append(&job(3, "alice"), "z", 1);
        assert_eq!(log.len(&Name::parse("alice").unwrap()), 1);
        assert_eq!(log.len(&Name::parse("bob").unwrap()), 1);
    }
}
