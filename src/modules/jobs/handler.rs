use super::dto::{CreateJobResponse, JobResponse, JobSubmission};
use super::error::JobError;
use crate::common::response::{ApiError, ApiSuccess, ErrorResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::warn;
use validator::Validate;

/// Submit a render job
#[utoipa::path(
    post,
    path = "/jobs",
    request_body = JobSubmission,
    responses(
        (status = 202, description = "Job queued", body = CreateJobResponse),
        (status = 422, description = "Invalid submission", body = ErrorResponse),
        (status = 503, description = "Service shutting down", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn create_job(
    State(state): State<AppState>,
    Json(submission): Json<JobSubmission>,
) -> impl IntoResponse {
    if let Err(e) = submission.validate() {
        warn!("Rejected job submission: {}", e);
        return ApiError(e.to_string(), StatusCode::UNPROCESSABLE_ENTITY).into_response();
    }

    match state.dispatcher.submit(submission) {
        Ok(job) => ApiSuccess(CreateJobResponse::from(&job), StatusCode::ACCEPTED).into_response(),
        Err(JobError::ShuttingDown) => {
            ApiError(JobError::ShuttingDown.to_string(), StatusCode::SERVICE_UNAVAILABLE)
                .into_response()
        }
        Err(e) => ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}

/// Get job status
#[utoipa::path(
    get,
    path = "/jobs/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Current job state", body = JobResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&job_id) {
        Ok(job) => ApiSuccess(JobResponse::from(job), StatusCode::OK).into_response(),
        Err(JobError::NotFound(_)) => ApiError::not_found().into_response(),
        Err(e) => ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    }
}
