use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, info_span, warn, Instrument};

use super::render::{panic_message, RenderRunner};
use crate::common::metrics;
use crate::modules::jobs::dto::JobSubmission;
use crate::modules::jobs::error::{JobError, JobResult};
use crate::modules::jobs::model::{new_job_id, Job};
use crate::modules::jobs::repository::JobRegistry;

/// Fresh ids to try before giving up on a collision streak.
const MAX_ID_ATTEMPTS: u32 = 5;

/// Accepts submissions and runs each on its own task.
///
/// At most `concurrency` renders run at once; extra jobs stay `queued` until
/// a permit frees up. Submission itself never waits.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn JobRegistry>,
    runner: Arc<RenderRunner>,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn JobRegistry>, runner: RenderRunner, concurrency: usize) -> Self {
        Self {
            registry,
            runner: Arc::new(runner),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a queued job and schedule it. Returns the queued snapshot.
    pub fn submit(&self, submission: JobSubmission) -> JobResult<Job> {
        if self.shutdown.is_cancelled() {
            return Err(JobError::ShuttingDown);
        }

        let job = self.create_entry(submission.webhook_url.clone())?;
        metrics::record_job_submitted();
        info!(job_id = job.id(), clips = submission.clips.len(), "📥 Job queued");

        let job_id = job.id().to_string();
        let span = info_span!("render_job", job_id = %job_id);
        let registry = Arc::clone(&self.registry);
        let runner = Arc::clone(&self.runner);
        let permits = Arc::clone(&self.permits);
        let cancel = self.shutdown.child_token();

        self.tracker.spawn(
            async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = permits.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    abandon(registry.as_ref(), &job_id, "cancelled before start");
                    return;
                };

                let result = AssertUnwindSafe(runner.run(&job_id, submission, cancel))
                    .catch_unwind()
                    .await;
                match result {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => error!(job_id = %job_id, "Job task aborted: {}", e),
                    Err(panic) => {
                        let reason = format!("worker panicked: {}", panic_message(panic.as_ref()));
                        error!(job_id = %job_id, "{}", reason);
                        abandon(registry.as_ref(), &job_id, &reason);
                    }
                }
            }
            .instrument(span),
        );

        Ok(job)
    }

    /// Jobs whose tasks have not finished yet, queued ones included.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop taking new jobs, cancel running renders and wait up to `grace`
    /// for tasks to wind down. Returns `true` if everything finished in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        info!(in_flight = self.in_flight(), "Shutting down dispatcher");
        self.shutdown.cancel();
        self.tracker.close();

        let drained = tokio::time::timeout(grace, self.tracker.wait()).await.is_ok();
        if !drained {
            warn!(in_flight = self.in_flight(), "Dispatcher shutdown timed out");
        }
        drained
    }

    fn create_entry(&self, webhook_url: Option<String>) -> JobResult<Job> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let job = Job::queued(new_job_id(), webhook_url.clone());
            match self.registry.create(job.clone()) {
                Ok(()) => return Ok(job),
                Err(JobError::DuplicateId(id)) => warn!(job_id = %id, "Job id collision, retrying"),
                Err(e) => return Err(e),
            }
        }
        Err(JobError::IdExhausted(MAX_ID_ATTEMPTS))
    }
}

/// Fail a job that never reached a terminal state. No-op if it already did.
fn abandon(registry: &dyn JobRegistry, job_id: &str, reason: &str) {
    if let Err(e) = registry.update(job_id, &mut |job| {
        if job.status().is_terminal() {
            Ok(())
        } else {
            job.fail(reason)
        }
    }) {
        warn!(job_id, "Could not mark job as failed: {}", e);
    }
}
