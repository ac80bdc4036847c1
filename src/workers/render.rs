use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::common::metrics;
use crate::infrastructure::render::{ProgressReporter, RenderBackend};
use crate::infrastructure::webhook::notifier::WebhookNotifier;
use crate::infrastructure::webhook::payload::WebhookPayload;
use crate::modules::jobs::dto::JobSubmission;
use crate::modules::jobs::error::JobResult;
use crate::modules::jobs::model::{Job, JobStatus};
use crate::modules::jobs::repository::JobRegistry;

/// Drives one job from `queued` to a terminal state and sends its webhook.
pub struct RenderRunner {
    registry: Arc<dyn JobRegistry>,
    backend: Arc<dyn RenderBackend>,
    notifier: Arc<WebhookNotifier>,
}

impl RenderRunner {
    pub fn new(
        registry: Arc<dyn JobRegistry>,
        backend: Arc<dyn RenderBackend>,
        notifier: Arc<WebhookNotifier>,
    ) -> Self {
        Self {
            registry,
            backend,
            notifier,
        }
    }

    /// Run the job and return its terminal snapshot.
    ///
    /// Backend errors and panics both end in `failed`; the only errors
    /// returned here are registry errors (unknown job, job not queued).
    pub async fn run(
        &self,
        job_id: &str,
        submission: JobSubmission,
        cancel: CancellationToken,
    ) -> JobResult<Job> {
        self.registry.update(job_id, &mut |job| job.start())?;
        info!(job_id, "▶️ Job processing");

        let progress = ProgressReporter::new(Arc::clone(&self.registry), job_id);
        let rendered = AssertUnwindSafe(self.backend.render(&submission, &progress, &cancel))
            .catch_unwind()
            .await;

        let terminal = match rendered {
            Ok(Ok(url)) if !url.trim().is_empty() => {
                self.registry.update(job_id, &mut |job| job.complete(url.clone()))?
            }
            Ok(Ok(_)) => self.fail(job_id, "render backend returned an empty artifact URL")?,
            Ok(Err(e)) => self.fail(job_id, &e.to_string())?,
            Err(panic) => self.fail(
                job_id,
                &format!("render backend panicked: {}", panic_message(panic.as_ref())),
            )?,
        };

        match terminal.status() {
            JobStatus::Ready => {
                metrics::record_job_completed();
                info!(
                    job_id,
                    url = terminal.result_url().unwrap_or_default(),
                    elapsed_ms = terminal.elapsed().whole_milliseconds() as i64,
                    "✅ Job ready"
                );
            }
            _ => {
                metrics::record_job_failed();
                error!(
                    job_id,
                    elapsed_ms = terminal.elapsed().whole_milliseconds() as i64,
                    "❌ Job failed: {}",
                    terminal.error().unwrap_or_default()
                );
            }
        }

        self.deliver(&terminal).await;
        Ok(terminal)
    }

    fn fail(&self, job_id: &str, reason: &str) -> JobResult<Job> {
        self.registry.update(job_id, &mut |job| job.fail(reason))
    }

    /// Send the webhook for a terminal job, if it asked for one. The outcome
    /// is logged and counted but never touches the job record.
    async fn deliver(&self, job: &Job) {
        let Some(url) = job.webhook_url() else {
            return;
        };
        let Some(payload) = WebhookPayload::from_terminal(job) else {
            warn!(job_id = job.id(), "Skipping webhook for non-terminal job");
            return;
        };

        self.notifier.notify(url, &payload).await;
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::render::RenderError;
    use crate::infrastructure::webhook::notifier::WebhookConfig;
    use crate::modules::jobs::dto::ClipRef;
    use crate::modules::jobs::repository::InMemoryJobRegistry;
    use async_trait::async_trait;

    enum Scripted {
        Succeed(&'static str),
        Fail,
        Panic,
    }

    #[async_trait]
    impl RenderBackend for Scripted {
        async fn render(
            &self,
            _submission: &JobSubmission,
            progress: &ProgressReporter,
            _cancel: &CancellationToken,
        ) -> Result<String, RenderError> {
            progress.report(50);
            match self {
                Scripted::Succeed(url) => Ok(url.to_string()),
                Scripted::Fail => Err(RenderError::StepFailed {
                    step: 3,
                    reason: "codec missing".into(),
                }),
                Scripted::Panic => panic!("gpu fell off the bus"),
            }
        }
    }

    fn runner(backend: Scripted) -> (Arc<InMemoryJobRegistry>, RenderRunner) {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let notifier = Arc::new(WebhookNotifier::new(WebhookConfig::default()).unwrap());
        let runner = RenderRunner::new(registry.clone(), Arc::new(backend), notifier);
        (registry, runner)
    }

    fn submission() -> JobSubmission {
        JobSubmission::new(vec![ClipRef { url: "a.mp4".into() }])
    }

    #[tokio::test]
    async fn test_success_marks_ready() {
        let (registry, runner) = runner(Scripted::Succeed("https://cdn/out.mp4"));
        registry.create(Job::queued("J_00000001", None)).unwrap();

        let job = runner
            .run("J_00000001", submission(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Ready);
        assert_eq!(job.progress(), 100);
        assert_eq!(job.result_url(), Some("https://cdn/out.mp4"));
        assert_eq!(registry.get("J_00000001").unwrap(), job);
    }

    #[tokio::test]
    async fn test_backend_error_marks_failed() {
        let (registry, runner) = runner(Scripted::Fail);
        registry.create(Job::queued("J_00000001", None)).unwrap();

        let job = runner
            .run("J_00000001", submission(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.error(), Some("render step 3 failed: codec missing"));
        assert!(job.result_url().is_none());
        assert_eq!(job.progress(), 50);
    }

    #[tokio::test]
    async fn test_backend_panic_marks_failed() {
        let (registry, runner) = runner(Scripted::Panic);
        registry.create(Job::queued("J_00000001", None)).unwrap();

        let job = runner
            .run("J_00000001", submission(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(job.status(), JobStatus::Failed);
        assert!(job.error().unwrap().contains("gpu fell off the bus"));
    }

    #[tokio::test]
    async fn test_empty_artifact_url_is_a_failure() {
        let (registry, runner) = runner(Scripted::Succeed("  "));
        registry.create(Job::queued("J_00000001", None)).unwrap();

        let job = runner
            .run("J_00000001", submission(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(job.status(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_job_is_an_error() {
        let (_registry, runner) = runner(Scripted::Succeed("https://cdn/out.mp4"));
        assert!(runner
            .run("J_missing0", submission(), CancellationToken::new())
            .await
            .is_err());
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u32), "unknown panic");
    }
}
