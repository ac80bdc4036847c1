use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use crate::common::response::{ApiSuccess, HealthResponse};
use crate::docs::ApiDoc;
use axum::{http::StatusCode, response::IntoResponse, Router};
use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};

pub fn configure_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes())
        .merge(crate::modules::jobs::router())
        .layer(cors)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", axum::routing::get(health))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health() -> impl IntoResponse {
    ApiSuccess(HealthResponse { ok: true }, StatusCode::OK)
}
