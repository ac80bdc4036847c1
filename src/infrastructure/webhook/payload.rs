use serde::{Deserialize, Serialize};

use crate::modules::jobs::model::{Job, JobStatus};

/// Body posted to a caller's webhook once a job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookPayload {
    /// Build from a terminal snapshot. Returns `None` for jobs still in flight.
    pub fn from_terminal(job: &Job) -> Option<Self> {
        if !job.status().is_terminal() {
            return None;
        }

        Some(Self {
            job_id: job.id().to_string(),
            status: job.status(),
            download_url: job.result_url().map(str::to_string),
            error: job.error().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_payload_carries_download_url() {
        let mut job = Job::queued("J_0000abcd", Some("https://hook".into()));
        job.start().unwrap();
        job.complete("https://cdn.example.com/a.mp4").unwrap();

        let payload = WebhookPayload::from_terminal(&job).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "job_id": "J_0000abcd",
                "status": "ready",
                "download_url": "https://cdn.example.com/a.mp4"
            })
        );
    }

    #[test]
    fn test_failed_payload_carries_error() {
        let mut job = Job::queued("J_0000abcd", None);
        job.start().unwrap();
        job.fail("encoder crashed").unwrap();

        let payload = WebhookPayload::from_terminal(&job).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "job_id": "J_0000abcd", "status": "failed", "error": "encoder crashed" })
        );
    }

    #[test]
    fn test_non_terminal_job_has_no_payload() {
        let job = Job::queued("J_0000abcd", None);
        assert!(WebhookPayload::from_terminal(&job).is_none());
    }
}
