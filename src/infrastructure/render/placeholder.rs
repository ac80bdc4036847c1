use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{ProgressReporter, RenderBackend, RenderError};
use crate::config::settings::DEFAULT_RESULT_URL;
use crate::modules::jobs::dto::JobSubmission;

#[derive(Debug, Clone)]
pub struct PlaceholderConfig {
    pub steps: u32,
    pub step_delay: Duration,
    pub result_url: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            steps: 5,
            step_delay: Duration::from_secs(2),
            result_url: DEFAULT_RESULT_URL.to_string(),
        }
    }
}

/// Stand-in renderer: sleeps through a fixed number of even steps and hands
/// back a fixed artifact URL.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRenderer {
    config: PlaceholderConfig,
}

impl PlaceholderRenderer {
    pub fn new(config: PlaceholderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl RenderBackend for PlaceholderRenderer {
    async fn render(
        &self,
        submission: &JobSubmission,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<String, RenderError> {
        if submission.clips.is_empty() {
            return Err(RenderError::InvalidInput("no clips to render".into()));
        }

        let steps = self.config.steps.max(1);
        info!(
            job_id = %progress.job_id(),
            clips = submission.clips.len(),
            aspect_ratio = %submission.params.aspect_ratio,
            target_duration_sec = submission.params.target_duration_sec,
            "🎬 Rendering"
        );

        for step in 1..=steps {
            tokio::select! {
                _ = cancel.cancelled() => return Err(RenderError::Cancelled),
                _ = tokio::time::sleep(self.config.step_delay) => {}
            }

            // The final step is reported by the ready transition itself.
            if step < steps {
                progress.report(step_percent(step, steps));
            }
        }

        Ok(self.config.result_url.clone())
    }
}

/// Share of `steps` completed after `step`, in whole percent.
fn step_percent(step: u32, steps: u32) -> u8 {
    let percent = u64::from(step) * 100 / u64::from(steps.max(1));
    percent.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::dto::ClipRef;
    use crate::modules::jobs::model::{Job, JobStatus};
    use crate::modules::jobs::repository::{InMemoryJobRegistry, JobRegistry};
    use std::sync::Arc;

    fn fast_renderer(steps: u32) -> PlaceholderRenderer {
        PlaceholderRenderer::new(PlaceholderConfig {
            steps,
            step_delay: Duration::from_millis(1),
            result_url: "https://cdn.example.com/out.mp4".into(),
        })
    }

    fn processing_job(registry: &Arc<InMemoryJobRegistry>) -> ProgressReporter {
        registry.create(Job::queued("J_00000001", None)).unwrap();
        registry.update("J_00000001", &mut |job| job.start()).unwrap();
        let shared: Arc<dyn JobRegistry> = registry.clone();
        ProgressReporter::new(shared, "J_00000001")
    }

    #[tokio::test]
    async fn test_renders_and_reports_progress_below_100() {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let reporter = processing_job(&registry);
        let submission = JobSubmission::new(vec![ClipRef { url: "a.mp4".into() }]);

        let url = fast_renderer(5)
            .render(&submission, &reporter, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/out.mp4");
        let job = registry.get("J_00000001").unwrap();
        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(job.progress(), 80);
    }

    #[tokio::test]
    async fn test_cancellation_stops_render() {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let reporter = processing_job(&registry);
        let submission = JobSubmission::new(vec![ClipRef { url: "a.mp4".into() }]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let slow = PlaceholderRenderer::new(PlaceholderConfig {
            step_delay: Duration::from_secs(60),
            ..PlaceholderConfig::default()
        });
        let err = slow.render(&submission, &reporter, &cancel).await.unwrap_err();

        assert_eq!(err, RenderError::Cancelled);
        assert_eq!(registry.get("J_00000001").unwrap().progress(), 0);
    }

    #[tokio::test]
    async fn test_empty_submission_is_invalid() {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let reporter = processing_job(&registry);

        let err = fast_renderer(1)
            .render(&JobSubmission::new(vec![]), &reporter, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn test_step_percent_handles_large_step_counts() {
        assert_eq!(step_percent(1, 5), 20);
        assert_eq!(step_percent(2, 3), 66);
        assert_eq!(step_percent(u32::MAX - 1, u32::MAX), 99);
        assert_eq!(step_percent(50_000_000, 100_000_000), 50);
    }
}
