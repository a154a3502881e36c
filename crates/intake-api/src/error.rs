//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Every failure is
//! an [`AppError`]; its [`ErrorMetadata`] decides status, body and log level.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-facing message. For field violations: `field: message` pairs joined by `; `
    #[schema(example = "name: Name is required; email: Invalid email address")]
    pub error: String,
    /// Machine-readable error code for programmatic handling
    #[schema(example = "FIELD_VALIDATION_ERROR")]
    pub code: String,
    /// Whether sending the same request again may succeed
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            error: error.client_message(),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from intake-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// The request could not be read as multipart/form-data at all
/// (wrong content type, missing boundary).
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::MalformedRequest(rejection.body_text()))
    }
}

/// Map an error raised while streaming multipart fields. The body limit layer
/// surfaces as a 413 from the multipart reader.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed size".to_string())
    } else {
        AppError::MalformedRequest(err.body_text())
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    // Sensitive errors are logged with the detail the client never sees.
    let detail = if error.is_sensitive() {
        internal_detail(error)
    } else {
        error.client_message()
    };
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %detail, error_type = error_type, code = code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %detail, error_type = error_type, code = code, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %detail, error_type = error_type, code = code, "Request failed");
        }
    }
}

/// Error message followed by its whole source chain.
fn internal_detail(error: &AppError) -> String {
    let mut detail = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    detail
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(ErrorResponse::from_app_error(app_error))).into_response()
    }
}
