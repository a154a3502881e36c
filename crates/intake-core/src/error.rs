//! Error types module
//!
//! All failures of the intake pipeline are unified under [`AppError`]. Every
//! variant self-describes how it is presented to a client through
//! [`ErrorMetadata`], so the HTTP layer never has to inspect variants itself.
//!
//! The taxonomy separates "your input was invalid" (`MalformedRequest`,
//! `FieldValidation`, `FileRejected`, `PayloadTooLarge`) from "your input was
//! fine but nobody could be notified" (`DeliveryFailed`).

use crate::constants::DELIVERY_FAILED_MESSAGE;
use crate::models::{FieldViolation, FileRejectionKind, FileSlot};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for suspicious input like disguised executables
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FIELD_VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the same request may succeed if sent again later
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether the internal message must never reach the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Field validation failed: {}", join_violations(.0))]
    FieldValidation(Vec<FieldViolation>),

    #[error("{} rejected ({}): {reason}", .slot.label(), .kind.as_str())]
    FileRejected {
        slot: FileSlot,
        kind: FileRejectionKind,
        reason: String,
    },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn field_violation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::FieldValidation(vec![FieldViolation::new(field, message)])
    }

    /// Field violations carried by this error, if any.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            AppError::FieldValidation(violations) => violations,
            _ => &[],
        }
    }

    /// Short variant name for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::FieldValidation(_) => "FieldValidation",
            AppError::FileRejected { .. } => "FileRejected",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::DeliveryFailed(_) => "DeliveryFailed",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::MalformedRequest(_) => (
            400,
            "MALFORMED_REQUEST",
            false,
            Some("Send the form as multipart/form-data"),
            false,
            LogLevel::Debug,
        ),
        AppError::FieldValidation(_) => (
            400,
            "FIELD_VALIDATION_ERROR",
            false,
            Some("Correct the listed fields and submit again"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileRejected { kind, .. } => (
            400,
            "FILE_REJECTED",
            false,
            Some("Upload a PDF, JPEG, PNG or supported CAD file under the size limit"),
            false,
            match kind {
                FileRejectionKind::Executable | FileRejectionKind::Signature => LogLevel::Warn,
                _ => LogLevel::Debug,
            },
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and submit again"),
            false,
            LogLevel::Debug,
        ),
        AppError::DeliveryFailed(_) => (
            500,
            "DELIVERY_FAILED",
            true,
            Some("Your submission was valid; retry later or contact us directly"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MalformedRequest(msg) => format!("Malformed request: {}", msg),
            AppError::FieldValidation(violations) => join_violations(violations),
            AppError::FileRejected { slot, reason, .. } => {
                format!("{}: {}", slot.label(), reason)
            }
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::DeliveryFailed(_) => DELIVERY_FAILED_MESSAGE.to_string(),
            AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_validation_message_lists_every_field() {
        let err = AppError::FieldValidation(vec![
            FieldViolation::new("name", "Name is required"),
            FieldViolation::new("email", "Email is required"),
        ]);
        assert_eq!(
            err.client_message(),
            "name: Name is required; email: Email is required"
        );
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn file_rejection_message_names_the_slot() {
        let err = AppError::FileRejected {
            slot: FileSlot::Drawing2D,
            kind: FileRejectionKind::Signature,
            reason: "invalid PDF file signature".to_string(),
        };
        assert_eq!(err.client_message(), "2D File: invalid PDF file signature");
        assert_eq!(err.error_code(), "FILE_REJECTED");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn delivery_failure_hides_provider_detail() {
        let err = AppError::DeliveryFailed("smtp: 535 authentication failed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Failed to send email");
        assert!(err.is_sensitive());
        assert!(err.is_recoverable());
        assert!(!err.client_message().contains("535"));
    }

    #[test]
    fn internal_with_source_from_anyhow() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn validation_and_delivery_have_distinct_codes() {
        let invalid = AppError::field_violation("quantity", "Quantity must be a whole number");
        let undelivered = AppError::DeliveryFailed("timeout".to_string());
        assert_ne!(invalid.error_code(), undelivered.error_code());
        assert_ne!(invalid.http_status_code(), undelivered.http_status_code());
    }
}
