//! Rendering backend seam.
//!
//! The lifecycle engine never touches media itself. It hands a submission to a
//! [`RenderBackend`], receives progress through a [`ProgressReporter`], and
//! gets back the location of the finished artifact.

pub mod placeholder;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::modules::jobs::dto::JobSubmission;
use crate::modules::jobs::repository::JobRegistry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("render step {step} failed: {reason}")]
    StepFailed { step: u32, reason: String },

    #[error("render cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Something that turns a submission into a finished video.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Render the submission and return the artifact URL.
    ///
    /// Implementations should report progress as they go and return
    /// [`RenderError::Cancelled`] promptly once `cancel` fires.
    async fn render(
        &self,
        submission: &JobSubmission,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<String, RenderError>;
}

/// Progress callback bound to one job.
#[derive(Clone)]
pub struct ProgressReporter {
    registry: Arc<dyn JobRegistry>,
    job_id: String,
}

impl ProgressReporter {
    pub fn new(registry: Arc<dyn JobRegistry>, job_id: impl Into<String>) -> Self {
        Self {
            registry,
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Record `percent` completion. Values that would move progress
    /// backwards are ignored by the job itself.
    pub fn report(&self, percent: u8) {
        match self
            .registry
            .update(&self.job_id, &mut |job| job.advance(percent))
        {
            Ok(job) => debug!(job_id = %self.job_id, progress = job.progress(), "Progress updated"),
            Err(e) => debug!(job_id = %self.job_id, "Progress update ignored: {}", e),
        }
    }
}
