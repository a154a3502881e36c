//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use intake_services::DispatchReceipt;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Project Intake API",
        version = "0.1.0",
        description = "Receives project submission forms with a 3D model and optional 2D drawing, validates fields and files, and forwards accepted submissions by email."
    ),
    paths(
        handlers::submit_project::submit_project,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::submit_project::SubmitProjectResponse,
        handlers::health::HealthResponse,
        DispatchReceipt,
        error::ErrorResponse,
    )),
    tags(
        (name = "submissions", description = "Project submission intake"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
