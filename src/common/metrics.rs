//! Counters for the job lifecycle.
//!
//! No exporter is installed here; without a recorder these calls are no-ops.

use metrics::counter;

use crate::infrastructure::webhook::notifier::DeliveryOutcome;

pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "reel_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "reel_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "reel_jobs_failed_total";
    pub const WEBHOOK_DELIVERIES_TOTAL: &str = "reel_webhook_deliveries_total";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

pub fn record_job_failed() {
    counter!(names::JOBS_FAILED_TOTAL).increment(1);
}

pub fn record_webhook_outcome(outcome: &DeliveryOutcome) {
    let label = if outcome.is_delivered() { "delivered" } else { "failed" };
    counter!(names::WEBHOOK_DELIVERIES_TOTAL, "outcome" => label).increment(1);
}
