use std::time::Duration;

use crate::config::env::{self, EnvKey, EnvReader};
use crate::infrastructure::render::placeholder::PlaceholderConfig;
use crate::infrastructure::webhook::notifier::WebhookConfig;

/// Artifact handed back by the placeholder renderer when no override is set.
pub const DEFAULT_RESULT_URL: &str =
    "https://sample-videos.com/video321/mp4/360/big_buck_bunny_360p_1mb.mp4";

/// One progress report per step, so more steps than percentage points is noise.
pub const MAX_RENDER_STEPS: u32 = 100;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub webhook_secret: String,
    pub webhook_timeout_secs: u64,
    pub webhook_max_attempts: u32,
    pub worker_concurrency: usize,
    pub render_steps: u32,
    pub render_step_delay_ms: u64,
    pub render_result_url: String,
    pub shutdown_grace_secs: u64,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            webhook_secret: String::new(),
            webhook_timeout_secs: 15,
            webhook_max_attempts: 3,
            worker_concurrency: 8,
            render_steps: 5,
            render_step_delay_ms: 2000,
            render_result_url: DEFAULT_RESULT_URL.to_string(),
            shutdown_grace_secs: 10,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn new() -> Self {
        Self::from_lookup(env::process)
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Every key has a default; numeric values that fail to parse fall back to
    /// their default, counts are clamped to at least one and render steps to
    /// at most [`MAX_RENDER_STEPS`].
    pub fn from_lookup(lookup: impl Fn(EnvKey) -> Option<String>) -> Self {
        let env = EnvReader::new(lookup);
        let defaults = Self::default();

        Self {
            server_port: env.get_parsed(EnvKey::ServerPort, defaults.server_port),
            webhook_secret: env.get_or(EnvKey::WebhookSecret, ""),
            webhook_timeout_secs: env
                .get_parsed(EnvKey::WebhookTimeoutSecs, defaults.webhook_timeout_secs)
                .max(1),
            webhook_max_attempts: env
                .get_parsed(EnvKey::WebhookMaxAttempts, defaults.webhook_max_attempts)
                .max(1),
            worker_concurrency: env
                .get_parsed(EnvKey::WorkerConcurrency, defaults.worker_concurrency)
                .max(1),
            render_steps: env
                .get_parsed(EnvKey::RenderSteps, defaults.render_steps)
                .clamp(1, MAX_RENDER_STEPS),
            render_step_delay_ms: env
                .get_parsed(EnvKey::RenderStepDelayMs, defaults.render_step_delay_ms),
            render_result_url: env.get_or(EnvKey::RenderResultUrl, DEFAULT_RESULT_URL),
            shutdown_grace_secs: env
                .get_parsed(EnvKey::ShutdownGraceSecs, defaults.shutdown_grace_secs),
            json_logs: env
                .get_or(EnvKey::LogFormat, "text")
                .trim()
                .eq_ignore_ascii_case("json"),
        }
    }

    pub fn webhook(&self) -> WebhookConfig {
        WebhookConfig {
            secret: self.webhook_secret.clone(),
            timeout: Duration::from_secs(self.webhook_timeout_secs),
            max_attempts: self.webhook_max_attempts,
            ..WebhookConfig::default()
        }
    }

    pub fn placeholder(&self) -> PlaceholderConfig {
        PlaceholderConfig {
            steps: self.render_steps,
            step_delay: Duration::from_millis(self.render_step_delay_ms),
            result_url: self.render_result_url.clone(),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
