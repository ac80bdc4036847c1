//! Signed webhook delivery.
//!
//! One JSON body is serialized per notification and signed once; every attempt
//! sends those exact bytes. Transient failures (network, timeout, 429, 5xx)
//! are retried with exponential backoff and full jitter up to `max_attempts`.
//! Delivery is best effort: the caller gets a [`DeliveryOutcome`], never an
//! error to propagate.

use std::time::Duration;

use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{info, warn};

use super::payload::WebhookPayload;
use super::signer::{Signer, SIGNATURE_HEADER};
use crate::common::metrics;

pub const JOB_ID_HEADER: &str = "X-Reel-Job-Id";
pub const ATTEMPT_HEADER: &str = "X-Reel-Delivery-Attempt";

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub secret: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            timeout: Duration::from_secs(15),
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("failed to serialize payload: {0}")]
    Serialize(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("endpoint responded with HTTP {0}")]
    Status(u16),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Timeout | DeliveryError::Network(_) => true,
            DeliveryError::Status(code) => *code == 429 || *code >= 500,
            DeliveryError::Serialize(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32, status: u16 },
    Failed { attempts: u32, error: DeliveryError },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryOutcome::Delivered { attempts, .. } | DeliveryOutcome::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    signer: Signer,
    config: WebhookConfig,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reel-jobs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            signer: Signer::new(config.secret.clone()),
            config,
        })
    }

    pub async fn notify(&self, url: &str, payload: &WebhookPayload) -> DeliveryOutcome {
        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                let outcome = DeliveryOutcome::Failed {
                    attempts: 0,
                    error: DeliveryError::Serialize(e.to_string()),
                };
                metrics::record_webhook_outcome(&outcome);
                return outcome;
            }
        };
        let signature = self.signer.sign(&body);
        let max_attempts = self.config.max_attempts.max(1);

        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;

            match self
                .send_once(url, &payload.job_id, &body, &signature, attempt)
                .await
            {
                Ok(status) => break DeliveryOutcome::Delivered { attempts: attempt, status },
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        job_id = %payload.job_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Webhook delivery failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => break DeliveryOutcome::Failed { attempts: attempt, error: e },
            }
        };

        match &outcome {
            DeliveryOutcome::Delivered { attempts, status } => {
                info!(job_id = %payload.job_id, attempts, status, "📨 Webhook delivered");
            }
            DeliveryOutcome::Failed { attempts, error } => {
                warn!(job_id = %payload.job_id, attempts, "Webhook delivery gave up: {}", error);
            }
        }
        metrics::record_webhook_outcome(&outcome);
        outcome
    }

    async fn send_once(
        &self,
        url: &str,
        job_id: &str,
        body: &[u8],
        signature: &str,
        attempt: u32,
    ) -> Result<u16, DeliveryError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .header(JOB_ID_HEADER, job_id)
            .header(ATTEMPT_HEADER, attempt.to_string())
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(DeliveryError::Status(status.as_u16()))
        }
    }

    /// Exponential backoff with full jitter: uniform in `0..=min(base * 2^(n-1), max)`.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.base_backoff.as_millis() as u64;
        let cap = self.config.max_backoff.as_millis() as u64;
        let exp = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(cap);

        if capped == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=capped))
    }
}
