use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_submission;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use intake_core::constants::SUBMISSION_ACCEPTED_MESSAGE;
use intake_services::DispatchReceipt;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitProjectResponse {
    #[schema(example = "Email sent successfully")]
    pub message: String,
    /// Result returned by the notification provider
    pub data: DispatchReceipt,
    pub submission_id: Uuid,
}

/// Submit a project request with its 3D model and optional 2D drawing.
///
/// Text fields: `name`, `email`, `projectName`, `material`, `quantity`,
/// `surfaceTreatment`, `tolerance`, `deliveryDate`, `destination`,
/// `additionalNotes`. File parts: `file3D` (required), `file2D` (optional).
#[utoipa::path(
    post,
    path = "/api/submit-project",
    tag = "submissions",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Submission validated and forwarded", body = SubmitProjectResponse),
        (status = 400, description = "Malformed request, invalid field or rejected file", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Submission was valid but could not be delivered", body = ErrorResponse)
    )
)]
pub async fn submit_project(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitProjectResponse>, HttpAppError> {
    let multipart = multipart?;

    let raw = extract_submission(multipart, state.submissions.max_file_size()).await?;
    let outcome = state.submissions.submit(raw).await?;

    Ok(Json(SubmitProjectResponse {
        message: SUBMISSION_ACCEPTED_MESSAGE.to_string(),
        data: outcome.receipt,
        submission_id: outcome.submission_id,
    }))
}
