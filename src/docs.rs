use utoipa::OpenApi;
use crate::common::response::{ErrorResponse, HealthResponse};
use crate::modules::jobs::dto::*;
use crate::modules::jobs::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::modules::jobs::handler::create_job,
        crate::modules::jobs::handler::get_job,
    ),
    components(
        schemas(
            JobSubmission, ClipRef, MusicRef, RenderParams,
            CreateJobResponse, JobResponse, JobStatus,
            ErrorResponse, HealthResponse,
        )
    ),
    tags(
        (name = "Jobs", description = "Render job submission and status"),
        (name = "System", description = "Service health")
    )
)]
pub struct ApiDoc;
