//! Pending randomness requests.

use orng_types::{Job, JobId, Name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open jobs keyed by id. Ids are handed out sequentially from 0 and never
/// reused, even after the job is fulfilled or killed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStore {
    jobs: BTreeMap<JobId, Job>,
    next_id: JobId,
}

impl JobStore {
    /// The id the next inserted job will receive.
    pub fn next_id(&self) -> JobId {
        self.next_id
    }

    pub fn insert(&mut self, assoc_id: u64, signing_value: u64, caller: Name) -> &Job {
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.entry(id).or_insert(Job {
            id,
            assoc_id,
            signing_value,
            caller,
        })
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        self.jobs.remove(&id)
    }

    /// Remove every listed job that exists; unknown ids are skipped.
    pub fn remove_many(&mut self, ids: &[JobId]) -> Vec<Job> {
        ids.iter().filter_map(|id| self.jobs.remove(id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn by_caller<'a>(&'a self, caller: &'a Name) -> impl Iterator<Item = &'a Job> + 'a {
        self.jobs.values().filter(move |job| &job.caller == caller)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
