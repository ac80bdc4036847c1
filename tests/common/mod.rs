//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use reel_jobs::infrastructure::render::placeholder::{PlaceholderConfig, PlaceholderRenderer};
use reel_jobs::infrastructure::render::{ProgressReporter, RenderBackend, RenderError};
use reel_jobs::infrastructure::webhook::notifier::{WebhookConfig, WebhookNotifier};
use reel_jobs::modules::jobs::dto::{ClipRef, JobSubmission};
use reel_jobs::modules::jobs::model::Job;
use reel_jobs::modules::jobs::repository::{InMemoryJobRegistry, JobRegistry};
use reel_jobs::workers::dispatcher::Dispatcher;
use reel_jobs::workers::render::RenderRunner;

pub const SECRET: &str = "integration-secret";
pub const ARTIFACT_URL: &str = "https://cdn.example.com/renders/out.mp4";

pub fn fast_placeholder(step_delay: Duration) -> PlaceholderRenderer {
    PlaceholderRenderer::new(PlaceholderConfig {
        steps: 5,
        step_delay,
        result_url: ARTIFACT_URL.to_string(),
    })
}

pub fn webhook_config() -> WebhookConfig {
    WebhookConfig {
        secret: SECRET.to_string(),
        timeout: Duration::from_secs(2),
        max_attempts: 2,
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(20),
    }
}

pub fn engine(
    backend: Arc<dyn RenderBackend>,
    concurrency: usize,
) -> (Arc<dyn JobRegistry>, Dispatcher) {
    let registry: Arc<dyn JobRegistry> = Arc::new(InMemoryJobRegistry::new());
    let notifier = Arc::new(WebhookNotifier::new(webhook_config()).expect("webhook client"));
    let runner = RenderRunner::new(Arc::clone(&registry), backend, notifier);
    let dispatcher = Dispatcher::new(Arc::clone(&registry), runner, concurrency);
    (registry, dispatcher)
}

pub fn submission() -> JobSubmission {
    JobSubmission::new(vec![ClipRef {
        url: "a.mp4".to_string(),
    }])
}

/// Poll until the job is terminal, collecting every progress value seen.
pub async fn wait_terminal(
    registry: &Arc<dyn JobRegistry>,
    job_id: &str,
    timeout: Duration,
) -> (Job, Vec<u8>) {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut seen = Vec::new();

    loop {
        let job = registry.get(job_id).expect("job should exist");
        seen.push(job.progress());
        if job.status().is_terminal() {
            return (job, seen);
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} did not finish in {timeout:?}; last state {:?}",
            job.status()
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

pub fn assert_non_decreasing(values: &[u8]) {
    assert!(
        values.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {values:?}"
    );
}

/// Backend that fails on a chosen step.
pub struct FailingBackend;

#[async_trait]
impl RenderBackend for FailingBackend {
    async fn render(
        &self,
        _submission: &JobSubmission,
        progress: &ProgressReporter,
        _cancel: &CancellationToken,
    ) -> Result<String, RenderError> {
        progress.report(20);
        Err(RenderError::StepFailed {
            step: 2,
            reason: "source clip unreadable".to_string(),
        })
    }
}

/// Backend that panics mid-render.
pub struct PanickingBackend;

#[async_trait]
impl RenderBackend for PanickingBackend {
    async fn render(
        &self,
        _submission: &JobSubmission,
        progress: &ProgressReporter,
        _cancel: &CancellationToken,
    ) -> Result<String, RenderError> {
        progress.report(40);
        panic!("encoder segfault");
    }
}
