use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::error::{JobError, JobResult};
use super::model::Job;

/// Storage for job records.
///
/// Implementations must make `update` atomic per job: concurrent readers see
/// either the record before the mutator ran or after it committed, never a
/// half-applied change.
pub trait JobRegistry: Send + Sync {
    /// Insert a new record. Fails with [`JobError::DuplicateId`] if the id is taken.
    fn create(&self, job: Job) -> JobResult<()>;

    /// Snapshot of the current record.
    fn get(&self, job_id: &str) -> JobResult<Job>;

    /// Apply `mutator` to the record and return the committed snapshot.
    /// If the mutator errors, the stored record is left untouched.
    fn update(
        &self,
        job_id: &str,
        mutator: &mut dyn FnMut(&mut Job) -> JobResult<()>,
    ) -> JobResult<Job>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local registry. Locking is per shard, so jobs rarely contend.
#[derive(Debug, Default)]
pub struct InMemoryJobRegistry {
    jobs: DashMap<String, Job>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn create(&self, job: Job) -> JobResult<()> {
        match self.jobs.entry(job.id().to_string()) {
            Entry::Occupied(entry) => Err(JobError::DuplicateId(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(job);
                Ok(())
            }
        }
    }

    fn get(&self, job_id: &str) -> JobResult<Job> {
        self.jobs
            .get(job_id)
            .map(|job| job.value().clone())
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))
    }

    fn update(
        &self,
        job_id: &str,
        mutator: &mut dyn FnMut(&mut Job) -> JobResult<()>,
    ) -> JobResult<Job> {
        let mut entry = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;

        // Mutate a copy while holding the shard lock, commit on success.
        let mut draft = entry.value().clone();
        mutator(&mut draft)?;
        *entry.value_mut() = draft.clone();
        Ok(draft)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}
