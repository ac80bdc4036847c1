use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{JobError, JobResult};

/// Highest progress a job may report before it is marked ready.
pub const MAX_PROCESSING_PROGRESS: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Ready,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Ready => "ready",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate an identifier of the form `J_` + 8 lowercase hex chars.
pub fn new_job_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("J_{}", &hex[..8])
}

/// A tracked rendering job.
///
/// Fields are private so every change goes through the transition methods,
/// which keep `result_url` and `error` mutually exclusive and only ever move
/// the status forward.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: String,
    status: JobStatus,
    progress: u8,
    result_url: Option<String>,
    error: Option<String>,
    webhook_url: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Job {
    pub fn queued(id: impl Into<String>, webhook_url: Option<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            progress: 0,
            result_url: None,
            error: None,
            webhook_url,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// `queued -> processing`, progress reset to zero.
    pub fn start(&mut self) -> JobResult<()> {
        self.require(JobStatus::Queued, JobStatus::Processing)?;
        self.status = JobStatus::Processing;
        self.progress = 0;
        self.touch();
        Ok(())
    }

    /// Raise progress while processing. Lower values are ignored and the
    /// value is capped below 100; only [`Job::complete`] reaches 100.
    pub fn advance(&mut self, percent: u8) -> JobResult<()> {
        self.require(JobStatus::Processing, JobStatus::Processing)?;
        let capped = percent.min(MAX_PROCESSING_PROGRESS);
        if capped > self.progress {
            self.progress = capped;
            self.touch();
        }
        Ok(())
    }

    /// `processing -> ready` with the artifact location.
    pub fn complete(&mut self, result_url: impl Into<String>) -> JobResult<()> {
        self.require(JobStatus::Processing, JobStatus::Ready)?;
        self.status = JobStatus::Ready;
        self.progress = 100;
        self.result_url = Some(result_url.into());
        self.error = None;
        self.touch();
        Ok(())
    }

    /// Move to `failed` from any non-terminal state.
    pub fn fail(&mut self, reason: impl Into<String>) -> JobResult<()> {
        if self.status.is_terminal() {
            return Err(JobError::InvalidTransition {
                from: self.status,
                to: JobStatus::Failed,
            });
        }
        let reason = reason.into();
        self.status = JobStatus::Failed;
        self.error = Some(if reason.trim().is_empty() {
            "render failed".to_string()
        } else {
            reason
        });
        self.result_url = None;
        self.touch();
        Ok(())
    }

    fn require(&self, current: JobStatus, to: JobStatus) -> JobResult<()> {
        if self.status == current {
            Ok(())
        } else {
            Err(JobError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Time from submission to the latest transition.
    pub fn elapsed(&self) -> time::Duration {
        self.updated_at - self.created_at
    }

    fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }
}
